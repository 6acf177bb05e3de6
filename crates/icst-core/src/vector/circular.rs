//! Single-threaded circular FIFO for `f32` samples.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Circular FIFO holding up to `capacity` samples.
///
/// Reads and writes are all-or-nothing: a request that does not fit returns
/// `false` and leaves both the buffer and the destination untouched.
///
/// # Example
///
/// ```rust
/// use icst_core::vector::CircBuffer;
///
/// let mut buf = CircBuffer::new(4);
/// assert!(buf.write(&[1.0, 2.0, 3.0]));
/// assert!(!buf.write(&[4.0, 5.0]));
///
/// let mut out = [0.0; 2];
/// assert!(buf.read(&mut out));
/// assert_eq!(out, [1.0, 2.0]);
/// assert_eq!(buf.read_size(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CircBuffer {
    data: Vec<f32>,
    rptr: usize,
    wptr: usize,
}

impl CircBuffer {
    /// Creates an empty buffer for `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity + 1],
            rptr: 0,
            wptr: 0,
        }
    }

    /// Maximum number of stored samples.
    pub fn capacity(&self) -> usize {
        self.data.len() - 1
    }

    /// Empties the buffer and zeroes its contents.
    pub fn reset(&mut self) {
        self.data.fill(0.0);
        self.rptr = 0;
        self.wptr = 0;
    }

    /// Number of samples available to [`read`](Self::read).
    pub fn read_size(&self) -> usize {
        let b = self.data.len();
        (self.wptr + b - self.rptr) % b
    }

    /// Number of samples that fit into [`write`](Self::write).
    pub fn write_size(&self) -> usize {
        self.capacity() - self.read_size()
    }

    /// Appends `d`. Returns `false` on overflow.
    pub fn write(&mut self, d: &[f32]) -> bool {
        if d.len() > self.write_size() {
            return false;
        }
        let b = self.data.len();
        let first = d.len().min(b - self.wptr);
        self.data[self.wptr..self.wptr + first].copy_from_slice(&d[..first]);
        self.data[..d.len() - first].copy_from_slice(&d[first..]);
        self.wptr = (self.wptr + d.len()) % b;
        true
    }

    /// Removes `d.len()` samples into `d`. Returns `false` on underflow.
    pub fn read(&mut self, d: &mut [f32]) -> bool {
        if !self.copy_out(d, self.rptr) {
            return false;
        }
        self.rptr = (self.rptr + d.len()) % self.data.len();
        true
    }

    /// Copies `d.len()` samples starting `offset` samples after the read
    /// position without consuming them.
    ///
    /// A negative `offset` looks back into data already read, which stays
    /// valid until it is overwritten. Returns `false` if the range would
    /// cross the write position.
    pub fn read_passive(&self, d: &mut [f32], offset: isize) -> bool {
        let b = self.data.len() as isize;
        if offset.abs() >= b {
            return false;
        }
        let start = (self.rptr as isize + offset).rem_euclid(b) as usize;
        self.copy_out(d, start)
    }

    fn copy_out(&self, d: &mut [f32], start: usize) -> bool {
        let b = self.data.len();
        let avail = (self.wptr + b - start) % b;
        if d.len() > avail {
            return false;
        }
        let first = d.len().min(b - start);
        let n = d.len();
        d[..first].copy_from_slice(&self.data[start..start + first]);
        d[first..].copy_from_slice(&self.data[..n - first]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around() {
        let mut buf = CircBuffer::new(5);
        let mut out = [0.0f32; 4];
        assert!(buf.write(&[1.0, 2.0, 3.0, 4.0]));
        assert!(buf.read(&mut out));
        // write crosses the physical end of the storage
        assert!(buf.write(&[5.0, 6.0, 7.0, 8.0, 9.0]));
        assert_eq!(buf.write_size(), 0);
        let mut out5 = [0.0f32; 5];
        assert!(buf.read(&mut out5));
        assert_eq!(out5, [5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(buf.read_size(), 0);
    }

    #[test]
    fn underflow_leaves_destination() {
        let mut buf = CircBuffer::new(3);
        assert!(buf.write(&[1.0]));
        let mut out = [7.0f32; 2];
        assert!(!buf.read(&mut out));
        assert_eq!(out, [7.0; 2]);
        assert_eq!(buf.read_size(), 1);
    }

    #[test]
    fn passive_read_does_not_consume() {
        let mut buf = CircBuffer::new(6);
        assert!(buf.write(&[1.0, 2.0, 3.0, 4.0]));
        let mut out = [0.0f32; 2];
        assert!(buf.read_passive(&mut out, 1));
        assert_eq!(out, [2.0, 3.0]);
        assert!(!buf.read_passive(&mut out, 3));
        assert_eq!(buf.read_size(), 4);
        assert!(buf.read(&mut out));
        assert!(buf.read_passive(&mut out, -2));
        assert_eq!(out, [1.0, 2.0]);
    }

    #[test]
    fn reset_empties() {
        let mut buf = CircBuffer::new(2);
        assert!(buf.write(&[1.0, 2.0]));
        buf.reset();
        assert_eq!(buf.read_size(), 0);
        assert_eq!(buf.write_size(), 2);
        assert_eq!(buf.capacity(), 2);
    }
}
