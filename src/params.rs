use crate::tree::Frame;

use parking_lot::Mutex;

use std::{fmt, iter, mem, slice};

// A captured parameter, as a byte range of the request path.
pub(crate) type Slot = (usize, usize);

/// Scratch space for one match: captured slots and the backtracking stack.
#[derive(Default)]
pub(crate) struct Buffer {
    pub(crate) slots: Vec<Slot>,
    pub(crate) frames: Vec<Frame>,
}

impl Buffer {
    fn with_width(width: usize) -> Buffer {
        Buffer {
            slots: Vec::with_capacity(width),
            frames: Vec::new(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.frames.clear();
    }
}

/// A free-list of match buffers shared by concurrent requests.
///
/// Buffers handed out always have room for `width` parameters, and every
/// buffer is emptied before it goes back on the list.
pub(crate) struct Pool {
    width: usize,
    free: Mutex<Vec<Buffer>>,
}

impl Pool {
    pub(crate) fn new(width: usize) -> Pool {
        Pool {
            width,
            free: Mutex::new(Vec::new()),
        }
    }

    #[cfg(test)]
    fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn acquire(&self) -> Pooled<'_> {
        let buf = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| Buffer::with_width(self.width));

        Pooled { buf, pool: self }
    }

    fn release(&self, mut buf: Buffer) {
        if buf.slots.capacity() < self.width {
            return;
        }

        buf.clear();
        self.free.lock().push(buf);
    }

    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

/// A buffer on loan from a [`Pool`], returned when dropped.
pub(crate) struct Pooled<'t> {
    buf: Buffer,
    pool: &'t Pool,
}

impl std::ops::Deref for Pooled<'_> {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        &self.buf
    }
}

impl std::ops::DerefMut for Pooled<'_> {
    fn deref_mut(&mut self) -> &mut Buffer {
        &mut self.buf
    }
}

impl Drop for Pooled<'_> {
    fn drop(&mut self) {
        self.pool.release(mem::take(&mut self.buf));
    }
}

/// The parameters captured by a route match.
///
/// Values are slices of the request path, aligned with the names declared
/// along the matched route.
///
/// ```rust
/// # use http::Method;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let mut router = tagroute::Router::new();
/// # router.get("/users/<id:int>/<tab>", [true]);
/// # let tree = router.build()?;
/// let matched = tree.at(&Method::GET, "/users/1/posts")?;
///
/// // Iterate through the keys and values.
/// for (key, value) in matched.params.iter() {
///     println!("key: {}, value: {}", key, value);
/// }
///
/// // Get a specific value by name.
/// assert_eq!(matched.params.get("id"), Some("1"));
/// assert_eq!(matched.params.get("tab"), Some("posts"));
/// # Ok(())
/// # }
/// ```
pub struct Params<'t, 'p> {
    path: &'p str,
    names: &'t [String],
    buf: Pooled<'t>,
}

impl<'t, 'p> Params<'t, 'p> {
    pub(crate) fn new(path: &'p str, names: &'t [String], mut buf: Pooled<'t>) -> Self {
        buf.slots.truncate(names.len());
        buf.frames.clear();
        Params { path, names, buf }
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.buf.slots.len()
    }

    /// Returns `true` if there are no parameters in the list.
    pub fn is_empty(&self) -> bool {
        self.buf.slots.is_empty()
    }

    /// Returns the value of the parameter registered under the given name.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&'p str> {
        let name = name.as_ref();
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.get_index(i))
    }

    /// Returns the value of the `i`th parameter.
    pub fn get_index(&self, i: usize) -> Option<&'p str> {
        let path = self.path;
        self.buf
            .slots
            .get(i)
            .and_then(|&(start, end)| path.get(start..end))
    }

    /// Returns an iterator over the parameters in the list.
    pub fn iter(&self) -> ParamsIter<'_, 't, 'p> {
        ParamsIter {
            path: self.path,
            inner: self.names.iter().zip(self.buf.slots.iter()),
        }
    }
}

impl fmt::Debug for Params<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// An iterator over the names and values of a route's [parameters](crate::Params).
pub struct ParamsIter<'ps, 't, 'p> {
    path: &'p str,
    inner: iter::Zip<slice::Iter<'t, String>, slice::Iter<'ps, Slot>>,
}

impl<'ps, 't, 'p> Iterator for ParamsIter<'ps, 't, 'p> {
    type Item = (&'t str, &'p str);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.path;
        self.inner
            .next()
            .map(|(name, &(start, end))| (name.as_str(), &path[start..end]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ParamsIter<'_, '_, '_> {}
