pub mod directory;
pub mod step;
pub mod template;
pub mod variable;

pub use directory::*;
pub use step::*;
pub use template::*;
pub use variable::*;
