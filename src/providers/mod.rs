mod qwen;
mod wanx;

pub use qwen::QwenSvg;
pub use wanx::{PollPolicy, WanxImages};
