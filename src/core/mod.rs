pub mod artifact;
pub mod mindmap;
pub mod pipeline;
pub mod storage;
pub mod transcript;

pub use artifact::*;
pub use mindmap::*;
pub use pipeline::*;
pub use storage::*;
pub use transcript::*;
