use ndarray::Array2;

pub type A2 = Array2<f32>;

/// Number of digit classes. Labels are one byte each but nominally in `0..NUM_CLASSES`.
pub const NUM_CLASSES: usize = 10;

/// Raw pixel value that maps to an intensity of 1.0.
pub const GREYSCALE_MAX: f32 = 255.0;

pub fn normalize(pixel: u8) -> f32 {
    pixel as f32 / GREYSCALE_MAX
}

/// One-hot encoding of `label`. Labels outside `0..NUM_CLASSES` give an all-zero vector.
pub fn one_hot(label: u8) -> [f32; NUM_CLASSES] {
    let mut e = [0.0_f32; NUM_CLASSES];
    if let Some(slot) = e.get_mut(label as usize) {
        *slot = 1.0;
    }
    e
}
