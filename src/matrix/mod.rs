// Matrix data structures and operations

pub mod config;
pub mod ellpack;
pub mod rows;
pub mod transpose;

pub use config::{detect_architecture, Architecture, Kernel, MultiplyConfig};
pub use ellpack::{release_all, EllpackMatrix};
pub use rows::RaggedRows;
pub use transpose::transpose;
