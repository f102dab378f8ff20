pub mod activity;
pub mod annotations;
pub mod binding;
pub mod child;
pub mod endpoint;

pub use activity::*;
pub use annotations::*;
pub use binding::*;
pub use child::*;
pub use endpoint::*;
