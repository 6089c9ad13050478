use crate::error::Result;

/// A set of puts applied together by [`Store::commit`].
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    puts: Vec<(Vec<u8>, Vec<u8>)>,
}

impl WriteBatch {
    pub fn new() -> WriteBatch {
        WriteBatch::default()
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> &mut Self {
        self.puts.push((key.to_vec(), value.to_vec()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.puts.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty()
    }
}

/// Byte-keyed storage holding one bucket of block records.
///
/// `commit` must be all-or-nothing: after it returns, either every put in
/// the batch is visible or none is, including across a crash.
pub trait Store {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn commit(&self, batch: &WriteBatch) -> Result<()>;

    /// Make committed data durable and release buffered resources.
    fn flush(&self) -> Result<()>;
}
