//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the jag crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use jag::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let library = Library::from_file("path/to/library.json")?;
//! for urn in library.urns() {
//!     println!("{}", library.tree(urn));
//! }
//! # Ok(())
//! # }
//! ```

// Model
pub use crate::model::{
    ANY, ANY_TYPE, Activity, ActivityBuilder, Annotations, Binding, CanonicalNode, ChildSlot,
    Direction, Endpoint, THIS,
};

// Connector taxonomy
pub use crate::taxonomy::{Connector, Execution, OnFail, Operator, Returns};

// Library and resolution
pub use crate::library::{ActivityResolver, ActivityStore, Library, LibraryTree};

// Serialization and validation
pub use crate::serialization::{IntoActivity, import};
pub use crate::validation::{ValidationOptions, is_valid_urn, validate_jag};

// Change notification
pub use crate::events::{ActivityEvent, ActivityObserver};

// Error types
pub use crate::error::{ConnectorViolation, JagError, SchemaViolation};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
