//! Ordered BSON document container.
//!
//! Elements live in an arena of nodes linked by `prev`/`next` indices, which
//! gives O(1) insertion at both ends and O(1) removal once a node is found.
//! Key lookups are linear scans from the head; documents hold tens of fields,
//! not millions.
//!
//! Field order is significant and preserved exactly. Duplicate keys are
//! allowed (as in BSON); keyed operations always act on the first match.

use std::fmt;

use crate::error::{DocumentError, ElementError};
use crate::limits::{DOCUMENT_OVERHEAD, MAX_WIRE_SIZE};
use crate::model::{Element, Value};

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    prev: Option<usize>,
    next: Option<usize>,
}

/// An ordered sequence of [`Element`]s.
#[derive(Clone, Default)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

/// Checks a batch for absent elements before anything is inserted.
fn collect_batch<I, E>(elements: I) -> Result<Vec<Element>, DocumentError>
where
    I: IntoIterator<Item = E>,
    E: Into<Option<Element>>,
{
    elements
        .into_iter()
        .enumerate()
        .map(|(index, e)| {
            let element: Option<Element> = e.into();
            element.ok_or(DocumentError::InvalidElement { index })
        })
        .collect()
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Creates a document from an initial element sequence.
    ///
    /// Fails with [`DocumentError::InvalidElement`] if any element is absent.
    pub fn from_elements<I, E>(elements: I) -> Result<Self, DocumentError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Element>>,
    {
        let mut doc = Document::new();
        doc.append(elements)?;
        Ok(doc)
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // =========================================================================
    // Arena plumbing
    // =========================================================================

    fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)?.as_ref()
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.nodes.get_mut(idx)?.as_mut()
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn unlink(&mut self, idx: usize) -> Option<Element> {
        let node = self.nodes.get_mut(idx)?.take()?;

        match node.prev.and_then(|p| self.node_mut(p)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.node_mut(n)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }

        self.free.push(idx);
        self.len -= 1;
        Some(node.element)
    }

    /// Index of the first node whose key matches, scanning from the head.
    fn find(&self, key: &str) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.node(idx)?;
            if node.element.key() == key {
                return Some(idx);
            }
            cursor = node.next;
        }
        None
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Adds an element at the tail.
    pub fn push_back(&mut self, element: Element) {
        let idx = self.alloc(Node {
            element,
            prev: self.tail,
            next: None,
        });
        match self.tail.and_then(|t| self.node_mut(t)) {
            Some(tail) => tail.next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
    }

    /// Adds an element at the head.
    pub fn push_front(&mut self, element: Element) {
        let idx = self.alloc(Node {
            element,
            prev: None,
            next: self.head,
        });
        match self.head.and_then(|h| self.node_mut(h)) {
            Some(head) => head.prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
    }

    /// Appends elements to the tail in the given order.
    ///
    /// Fails with [`DocumentError::InvalidElement`] if any element is absent;
    /// the document is left untouched in that case.
    pub fn append<I, E>(&mut self, elements: I) -> Result<&mut Self, DocumentError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Element>>,
    {
        for element in collect_batch(elements)? {
            self.push_back(element);
        }
        Ok(self)
    }

    /// Prepends elements one at a time at the head.
    ///
    /// Each element goes in front of the previous one, so a batch ends up in
    /// reverse order: prepending `[a, b]` to `[x]` yields `[b, a, x]`.
    /// Fails like [`Document::append`].
    pub fn prepend<I, E>(&mut self, elements: I) -> Result<&mut Self, DocumentError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Element>>,
    {
        for element in collect_batch(elements)? {
            self.push_front(element);
        }
        Ok(self)
    }

    /// Appends elements, silently skipping absent ones and those whose value
    /// is empty (see [`Value::is_empty`]).
    pub fn append_omit_empty<I, E>(&mut self, elements: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Option<Element>>,
    {
        for element in elements {
            let element: Option<Element> = element.into();
            match element {
                Some(element) if !element.value().is_empty() => self.push_back(element),
                Some(element) => {
                    tracing::trace!(key = element.key(), "skipping element with empty value");
                }
                None => tracing::trace!("skipping absent element"),
            }
        }
        self
    }

    // =========================================================================
    // Keyed access
    // =========================================================================

    /// Replaces the value of the first element with the same key, keeping its
    /// position. Returns false and leaves the document unchanged on a miss.
    pub fn set(&mut self, element: Element) -> bool {
        let (key, value) = element.into_parts();
        match self.find(&key).and_then(|idx| self.node_mut(idx)) {
            Some(node) => {
                node.element.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Replaces the value of the first element with the same key, or appends
    /// the element when the key is absent.
    pub fn upsert(&mut self, element: Element) {
        match self.find(element.key()) {
            Some(idx) => {
                if let Some(node) = self.node_mut(idx) {
                    node.element = element;
                }
            }
            None => self.push_back(element),
        }
    }

    /// Removes the first element with the given key and returns its value.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        let idx = self.find(key)?;
        self.unlink(idx).map(|element| element.into_parts().1)
    }

    /// Returns the value of the first element with the given key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.find(key)
            .and_then(|idx| self.node(idx))
            .map(|node| node.element.value())
    }

    /// Returns a mutable reference to the value of the first element with the given key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let idx = self.find(key)?;
        self.node_mut(idx).map(|node| node.element.value_mut())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    // =========================================================================
    // Ends
    // =========================================================================

    pub fn front(&self) -> Option<&Element> {
        self.head.and_then(|idx| self.node(idx)).map(|node| &node.element)
    }

    pub fn back(&self) -> Option<&Element> {
        self.tail.and_then(|idx| self.node(idx)).map(|node| &node.element)
    }

    pub fn pop_front(&mut self) -> Option<Element> {
        let idx = self.head?;
        self.unlink(idx)
    }

    pub fn pop_back(&mut self) -> Option<Element> {
        let idx = self.tail?;
        self.unlink(idx)
    }

    /// Removes all elements.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Iterates elements front to back.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            doc: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Iterates keys front to back.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.iter().map(Element::key)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validates every element head to tail and returns the total wire size:
    /// 4-byte length prefix, elements, 1-byte terminator.
    ///
    /// The first invalid element in document order is reported.
    pub fn validate(&self) -> Result<usize, DocumentError> {
        let size = self.wire_size().inspect_err(|err| {
            tracing::debug!(key = err.key(), error = %err, "document failed validation");
        })?;
        if size > MAX_WIRE_SIZE {
            return Err(DocumentError::DocumentTooLarge {
                size,
                limit: MAX_WIRE_SIZE,
            });
        }
        Ok(size)
    }

    /// Validates and sizes the document, reporting element failures verbatim.
    pub(crate) fn wire_size(&self) -> Result<usize, ElementError> {
        let mut total = DOCUMENT_OVERHEAD;
        for element in self.iter() {
            total = total.saturating_add(element.validate()?);
        }
        Ok(total)
    }
}

/// Front-to-back iterator over a document's elements.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    doc: &'a Document,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.doc.node(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.doc.node(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.element)
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Owning front-to-back iterator.
#[derive(Debug, Clone)]
pub struct IntoIter {
    doc: Document,
}

impl Iterator for IntoIter {
    type Item = Element;

    fn next(&mut self) -> Option<Self::Item> {
        self.doc.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.doc.len, Some(self.doc.len))
    }
}

impl DoubleEndedIterator for IntoIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.doc.pop_back()
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for Document {
    type Item = Element;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { doc: self }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Element;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Element> for Document {
    fn from_iter<T: IntoIterator<Item = Element>>(iter: T) -> Self {
        let mut doc = Document::new();
        doc.extend(iter);
        doc
    }
}

impl Extend<Element> for Document {
    fn extend<T: IntoIterator<Item = Element>>(&mut self, iter: T) {
        for element in iter {
            self.push_back(element);
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{")?;
        for (i, element) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {}", element)?;
        }
        f.write_str(" }")
    }
}
