//! Frame rendering and animation export.
//!
//! Consumers of the annealing search's improvement events:
//!
//! - [`FrameWriter`]: renders each event to a PNG on a background thread.
//! - [`export_animation`]: stitches the saved frames into a looping GIF.
//! - [`clear_output_dir`], [`prepare_output_dir`], [`list_frames`]: output
//!   directory housekeeping, with frames ordered by [`natural_cmp`].

mod animation;
mod frame;
mod natural;
mod output;
mod writer;

pub use animation::{export_animation, FINAL_FRAME_HOLD};
pub use frame::{
    frame_file_name, render_frame, save_frame, tile_color, upscale, OBSTACLE_REACHABLE,
    OBSTACLE_UNREACHABLE, PATH_REACHABLE, PATH_UNREACHABLE,
};
pub use natural::natural_cmp;
pub use output::{clear_output_dir, list_frames, prepare_output_dir};
pub use writer::{FrameWriter, DEFAULT_QUEUE_CAPACITY};
