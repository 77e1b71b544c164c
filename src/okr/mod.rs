//! OKR document model
//!
//! The core of the system: the codec that embeds structured OKR fields in
//! ticket descriptions, the classifiers that recover identity from titles
//! and labels, and the resolver that rebuilds the Objective→KR hierarchy
//! from link records.

pub mod activity_table;
pub mod classifier;
pub mod document;
pub mod hierarchy;

pub use activity_table::AppendStrategy;
pub use classifier::{classify_labels, LabelClassification, TitleClassifier};
pub use document::{DocumentCodec, KrFields, ObjectiveFields};
pub use hierarchy::HierarchyResolver;
