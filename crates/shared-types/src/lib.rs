//! Shared data model for the forms analyzer workspace
//!
//! Holds the document-access capability, the text normalizer and the
//! result types every other crate builds on.

pub mod access;
pub mod text;
pub mod types;

pub use access::{
    AccessError, BoundingBox, DigitalSignature, DocumentAccess, LineSegment, PageGraphics,
    TextBlock, WidgetInfo, WidgetKind,
};
pub use text::normalize_for_rules;
pub use types::{
    AnalysisResult, AnalysisStatus, Dependency, DependencyRelation, DocumentSummary,
    DomainTrust, Field, FieldClass, FieldCounts, FormReport, GraphicsStats, IndustryClass,
    Issuer, PiiKind, RiskFinding, Severity, SignatureProfile, ThirdPartyReport,
};
