mod template;
mod trigger;


pub use template::{render_template, work_item_vars};
pub use trigger::{HttpTrigger, RenderedRequest, TriggerSpec};
