//! # Jag - Joint Activity Graph Model
//!
//! **Jag** is the core model behind Joint Activity Graph authoring tools. A JAG describes
//! how an actor or team decomposes a task into sub-activities. Each activity carries
//! execution semantics (parallel, sequential, retry, loop, overlap), a return-value
//! aggregation operator, typed input and output endpoints, and data-flow bindings between
//! them.
//!
//! ## Core Workflow
//!
//! The model is storage-agnostic. It operates on [`model::Activity`] values and reaches
//! other activities only through an injected [`library::ActivityResolver`]. The usual
//! workflow is:
//!
//! 1.  **Load**: Parse documents with [`Activity::from_json`](model::Activity::from_json), or a
//!     whole set with [`Library::import_json`](library::Library::import_json). Every
//!     document is schema-checked first. Older connector and binding shapes are migrated.
//! 2.  **Edit**: Call the activity's mutators. Connector changes are coerced through the
//!     [`taxonomy`] tables so the combination stays legal.
//! 3.  **Query**: Ask which providers a child may bind from
//!     ([`inputs_to`](model::Activity::inputs_to)) and whether a binding is legal
//!     ([`is_legal_binding`](model::Activity::is_legal_binding)).
//! 4.  **Persist**: Write snapshots with [`to_json`](model::Activity::to_json) or
//!     [`Library::save`](library::Library::save).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jag::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut library = Library::new();
//!
//!     let boil = Activity::builder("urn:demo:boil", "Boil water")
//!         .output("water", "liquid")
//!         .build()?;
//!     let steep = Activity::builder("urn:demo:steep", "Steep")
//!         .input("water", "liquid")
//!         .output("tea", "liquid")
//!         .build()?;
//!     let tea = Activity::builder("urn:demo:tea", "Make tea")
//!         .execution(Execution::Sequential)
//!         .output("tea", "liquid")
//!         .build()?;
//!     library.create(boil)?;
//!     library.create(steep)?;
//!     library.create(tea)?;
//!
//!     let boil_id = library.add_child("urn:demo:tea", "urn:demo:boil")?;
//!     let steep_id = library.add_child("urn:demo:tea", "urn:demo:steep")?;
//!
//!     // Under sequential execution, the second child may read the first one's outputs.
//!     let parent = library.resolve("urn:demo:tea").ok_or("missing parent")?;
//!     for provider in parent.inputs_to(&steep_id, &library) {
//!         println!("{provider}");
//!     }
//!
//!     let from = Endpoint::output(boil_id.as_str(), "water", "liquid");
//!     let to = Endpoint::input(steep_id.as_str(), "water", "liquid");
//!     let binding = Binding::new(from, to);
//!     if parent.is_legal_binding(&binding, &library) {
//!         if let Some(parent) = library.get_mut("urn:demo:tea") {
//!             parent.add_binding(binding);
//!         }
//!     }
//!
//!     println!("{}", library.tree("urn:demo:tea"));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod events;
pub mod library;
pub mod model;
pub mod prelude;
pub mod serialization;
pub mod taxonomy;
pub mod validation;
