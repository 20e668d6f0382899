//! UTF-8 string with short-string optimization.
//!
//! [`SmallString`] stores its bytes in a [`SmallVec<u8, N>`], so strings of up to `N`
//! bytes live inside the struct and longer ones move to the heap once, never moving
//! back. Every mutation goes through `&str` or `char`, which keeps the buffer valid
//! UTF-8 at all times.
//!
//! Implements `Deref<Target = str>` so all `&str` methods are available directly.

use core::borrow::{Borrow, BorrowMut};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{AddAssign, Deref, DerefMut};
use core::str::{self, Utf8Error};

use crate::error::{CollectionError, Result};
use crate::vecs::small_vec::SmallVec;

/// Inline capacity of a [`SmallString`] when none is named.
pub const DEFAULT_INLINE_BYTES: usize = 23;

/// A string that keeps up to `N` bytes inline, then spills to the heap.
///
/// # Invariant
/// `bytes` always holds valid UTF-8.
pub struct SmallString<const N: usize = DEFAULT_INLINE_BYTES> {
    bytes: SmallVec<u8, N>,
}

impl<const N: usize> SmallString<N> {
    pub fn new() -> Self {
        Self {
            bytes: SmallVec::new(),
        }
    }

    /// Empty string with room for `capacity` bytes. Stays inline when `capacity <= N`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: SmallVec::with_capacity(capacity),
        }
    }

    /// Copies `bytes` in after checking they are valid UTF-8.
    ///
    /// # Errors
    /// The [`Utf8Error`] describing the first invalid sequence.
    pub fn from_utf8(bytes: &[u8]) -> core::result::Result<Self, Utf8Error> {
        Ok(Self::from(str::from_utf8(bytes)?))
    }

    /// Copies `bytes` in, replacing invalid sequences with U+FFFD.
    pub fn from_utf8_lossy(bytes: &[u8]) -> Self {
        Self::from(String::from_utf8_lossy(bytes).as_ref())
    }

    /// Returns `true` while the bytes live in the embedded buffer.
    #[inline(always)]
    pub fn using_inline_storage(&self) -> bool {
        self.bytes.using_inline_storage()
    }

    /// Length in bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Capacity in bytes.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.bytes.reserve(additional);
    }

    /// Releases spare heap capacity. Inline storage is left as is.
    pub fn shrink_to_fit(&mut self) {
        self.bytes.shrink_to_fit();
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // Safety: `bytes` is valid UTF-8.
        unsafe { str::from_utf8_unchecked(&self.bytes) }
    }

    #[inline]
    pub fn as_mut_str(&mut self) -> &mut str {
        // Safety: `bytes` is valid UTF-8, and `&mut str` cannot break that.
        unsafe { str::from_utf8_unchecked_mut(&mut self.bytes) }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn push(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.bytes
            .extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
    }

    pub fn push_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    /// Appends `bytes` if they are valid UTF-8; otherwise leaves the string untouched.
    ///
    /// # Errors
    /// The [`Utf8Error`] describing the first invalid sequence.
    pub fn push_utf8(&mut self, bytes: &[u8]) -> core::result::Result<(), Utf8Error> {
        self.push_str(str::from_utf8(bytes)?);
        Ok(())
    }

    /// Removes the last character.
    pub fn pop(&mut self) -> Option<char> {
        let ch = self.as_str().chars().next_back()?;
        let new_len = self.len() - ch.len_utf8();
        self.bytes.truncate(new_len);
        Some(ch)
    }

    /// Shortens the string to `new_len` bytes. Does nothing if `new_len >= len`.
    ///
    /// # Panics
    /// If `new_len` does not lie on a char boundary.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len < self.len() {
            assert!(
                self.as_str().is_char_boundary(new_len),
                "new length {new_len} is not a char boundary"
            );
            self.bytes.truncate(new_len);
        }
    }

    /// Keeps only the characters for which `f` returns `true`.
    ///
    /// The survivors are collected into fresh storage first, so a panicking `f`
    /// leaves the string unchanged.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(char) -> bool,
    {
        let mut kept: SmallVec<u8, N> = SmallVec::with_capacity(self.capacity());
        for ch in self.as_str().chars().filter(|&ch| f(ch)) {
            let mut buf = [0u8; 4];
            kept.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
        self.bytes = kept;
    }

    /// Byte at `index`.
    ///
    /// # Errors
    /// [`CollectionError::OutOfRange`] if `index >= len`.
    pub fn at(&self, index: usize) -> Result<u8> {
        self.bytes
            .get(index)
            .copied()
            .ok_or(CollectionError::out_of_range(index, self.len()))
    }

    /// First character.
    ///
    /// # Errors
    /// [`CollectionError::Empty`] on an empty string.
    pub fn front(&self) -> Result<char> {
        self.as_str().chars().next().ok_or(CollectionError::Empty)
    }

    /// Last character.
    ///
    /// # Errors
    /// [`CollectionError::Empty`] on an empty string.
    pub fn back(&self) -> Result<char> {
        self.as_str().chars().next_back().ok_or(CollectionError::Empty)
    }

    pub fn into_string(self) -> String {
        self.as_str().to_owned()
    }

    pub fn into_bytes(self) -> SmallVec<u8, N> {
        self.bytes
    }
}

impl<const N: usize> Deref for SmallString<N> {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> DerefMut for SmallString<N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut str {
        self.as_mut_str()
    }
}

impl<const N: usize> Default for SmallString<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Clone for SmallString<N> {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
        }
    }
}

impl<const N: usize> fmt::Display for SmallString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Debug for SmallString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Write for SmallString<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.push(c);
        Ok(())
    }
}

impl<const N: usize> From<&str> for SmallString<N> {
    fn from(s: &str) -> Self {
        let mut out = Self::with_capacity(s.len());
        out.push_str(s);
        out
    }
}

impl<const N: usize> From<char> for SmallString<N> {
    fn from(ch: char) -> Self {
        let mut out = Self::new();
        out.push(ch);
        out
    }
}

impl<const N: usize> AddAssign<&str> for SmallString<N> {
    fn add_assign(&mut self, rhs: &str) {
        self.push_str(rhs);
    }
}

impl<const N: usize> AddAssign<char> for SmallString<N> {
    fn add_assign(&mut self, rhs: char) {
        self.push(rhs);
    }
}

impl<const N: usize, const M: usize> PartialEq<SmallString<M>> for SmallString<N> {
    fn eq(&self, other: &SmallString<M>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<const N: usize> Eq for SmallString<N> {}

impl<const N: usize> PartialEq<str> for SmallString<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const N: usize> PartialEq<&str> for SmallString<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<const N: usize> PartialEq<String> for SmallString<N> {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<const N: usize> PartialEq<SmallString<N>> for &str {
    fn eq(&self, other: &SmallString<N>) -> bool {
        *self == other.as_str()
    }
}

impl<const N: usize, const M: usize> PartialOrd<SmallString<M>> for SmallString<N> {
    fn partial_cmp(&self, other: &SmallString<M>) -> Option<Ordering> {
        Some(self.as_str().cmp(other.as_str()))
    }
}

impl<const N: usize> Ord for SmallString<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl<const N: usize> Hash for SmallString<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl<const N: usize> Borrow<str> for SmallString<N> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> BorrowMut<str> for SmallString<N> {
    fn borrow_mut(&mut self) -> &mut str {
        self.as_mut_str()
    }
}

impl<const N: usize> AsRef<str> for SmallString<N> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> AsRef<[u8]> for SmallString<N> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<const N: usize> Extend<char> for SmallString<N> {
    fn extend<I: IntoIterator<Item = char>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for ch in iter {
            self.push(ch);
        }
    }
}

impl<'a, const N: usize> Extend<&'a str> for SmallString<N> {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for s in iter {
            self.push_str(s);
        }
    }
}

impl<const N: usize> FromIterator<char> for SmallString<N> {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

impl<'a, const N: usize> FromIterator<&'a str> for SmallString<N> {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use std::collections::HashSet;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn test_string_stays_inline_until_capacity() {
        let mut s: SmallString<8> = SmallString::new();
        s.push_str("12345678");
        assert!(s.using_inline_storage());
        assert_eq!(s.capacity(), 8);
        s.push('9');
        assert!(!s.using_inline_storage());
        assert_eq!(s, "123456789");
        s.clear();
        assert!(!s.using_inline_storage());
        assert!(s.is_empty());
    }

    #[test]
    fn test_string_spill_on_multibyte_char() {
        let mut s: SmallString<4> = SmallString::from("abc");
        s.push('é');
        assert!(!s.using_inline_storage());
        assert_eq!(s.len(), 5);
        assert_eq!(s.chars().count(), 4);
        assert_eq!(s.pop(), Some('é'));
        assert_eq!(s.as_str(), "abc");
    }

    #[test]
    fn test_string_push_utf8_checks_bytes() {
        let mut s: SmallString<16> = SmallString::from("ok");
        assert!(s.push_utf8(&[0xff, 0xfe]).is_err());
        assert_eq!(s, "ok");
        s.push_utf8("ü!".as_bytes()).unwrap();
        assert_eq!(s, "okü!");
        assert!(SmallString::<4>::from_utf8(&[b'a', 0xc3]).is_err());
        assert_eq!(SmallString::<4>::from_utf8_lossy(&[b'a', 0xff]), "a\u{fffd}");
    }

    #[test]
    fn test_string_checked_accessors() {
        let mut s: SmallString = SmallString::new();
        assert_eq!(s.front(), Err(CollectionError::Empty));
        assert_eq!(s.back(), Err(CollectionError::Empty));
        assert_eq!(s.at(0), Err(CollectionError::out_of_range(0, 0)));
        s += "añb";
        s += '!';
        assert_eq!(s.front(), Ok('a'));
        assert_eq!(s.back(), Ok('!'));
        assert_eq!(s.at(0), Ok(b'a'));
        assert_eq!(s.at(5), Err(CollectionError::out_of_range(5, 5)));
    }

    #[test]
    fn test_string_truncate_and_retain() {
        let mut s: SmallString<4> = "hello world".chars().collect();
        s.retain(|c| c != 'o');
        assert_eq!(s, "hell wrld");
        assert!(!s.using_inline_storage());
        s.truncate(4);
        assert_eq!(s, "hell");
        s.truncate(10);
        assert_eq!(s.len(), 4);

        let result = catch_unwind(AssertUnwindSafe(|| {
            s.retain(|c| if c == 'l' { panic!("stop") } else { true });
        }));
        assert!(result.is_err());
        assert_eq!(s, "hell");
    }

    #[test]
    #[should_panic(expected = "not a char boundary")]
    fn test_string_truncate_inside_char_panics() {
        let mut s: SmallString<8> = SmallString::from("é");
        s.truncate(1);
    }

    #[test]
    fn test_string_clone_equality_and_hashing() {
        let long: SmallString<4> = SmallString::from("a longer string");
        let copy = long.clone();
        assert_eq!(copy, long);
        assert!(!copy.using_inline_storage());

        let short: SmallString<32> = SmallString::from("a longer string");
        assert!(short.using_inline_storage());
        assert_eq!(long, short);
        assert_eq!(long, String::from("a longer string"));
        assert!("a longer string" == long);
        assert!(SmallString::<8>::from("abc") < SmallString::<8>::from("abd"));

        let set: HashSet<SmallString<8>> = ["x", "y", "x"].into_iter().map(SmallString::from).collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("y"));
    }

    #[test]
    fn test_string_fmt_write_and_deref() {
        let mut s: SmallString<8> = SmallString::new();
        write!(s, "{}-{}", 12, "ab").unwrap();
        assert_eq!(s, "12-ab");
        assert!(s.starts_with("12"));
        s.make_ascii_uppercase();
        assert_eq!(format!("{s}"), "12-AB");
        assert_eq!(format!("{s:?}"), "\"12-AB\"");
        let joined: SmallString<8> = ["ab", "cd"].into_iter().collect();
        assert_eq!(joined.into_string(), "abcd");
    }
}
