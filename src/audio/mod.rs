mod clip;

pub use clip::{mime_for, AudioClip, WavInfo};
