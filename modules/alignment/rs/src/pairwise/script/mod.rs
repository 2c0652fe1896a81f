pub use edit_script::EditScript;
pub use op::Op;
pub use step::Step;

mod edit_script;
mod op;
mod step;
