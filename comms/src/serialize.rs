/// Types that can be written into an outgoing frame.
pub trait Serialize<'a> {
    /// Writes the head of the frame into `buf`.
    ///
    /// # Returns
    /// An optional borrowed tail that is written right after `buf` without copying it.
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]>;
}
