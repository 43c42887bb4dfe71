#![cfg_attr(not(test), no_std)]

use core::{
  marker::PhantomData,
  ptr::NonNull,
};

use getset::{
  Getters,
  MutGetters,
};

pub trait HasLink {
  fn link(&self) -> &Link<Self>
  where
    Self: Sized;
  fn link_mut(&mut self) -> &mut Link<Self>
  where
    Self: Sized;
}

/// Intrusive link. Absent neighbors are `None`, never sentinel addresses.
#[derive(Debug, Getters, MutGetters)]
pub struct Link<T>
where
  T: HasLink,
{
  #[getset(get = "pub", get_mut = "pub")]
  next: Option<NonNull<T>>,
  #[getset(get = "pub", get_mut = "pub")]
  prev: Option<NonNull<T>>,
}

impl<T> Default for Link<T>
where
  T: HasLink,
{
  fn default() -> Self {
    Self {
      next: None,
      prev: None,
    }
  }
}

impl<T> Link<T>
where
  T: HasLink,
{
  pub fn is_linked(&self) -> bool {
    self.next.is_some() || self.prev.is_some()
  }
}

/// Owning head of one intrusive list. Items live elsewhere; the head only
/// tracks the first of them plus a length for diagnostics.
#[derive(Debug)]
pub struct ListHead<T>
where
  T: HasLink,
{
  head: Option<NonNull<T>>,
  len: usize,
}

impl<T> Default for ListHead<T>
where
  T: HasLink,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T> ListHead<T>
where
  T: HasLink,
{
  pub const fn new() -> Self {
    Self { head: None, len: 0 }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.head.is_none()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn head(&self) -> Option<NonNull<T>> {
    self.head
  }

  /// Links an unlinked item in front of the list.
  pub fn push_front(&mut self, item: &mut T) {
    debug_assert!(!item.link().is_linked());

    let item_ptr = NonNull::from(&mut *item);

    if let Some(mut old) = self.head {
      unsafe { old.as_mut() }.link_mut().prev = Some(item_ptr);
    }

    let link = item.link_mut();
    link.next = self.head;
    link.prev = None;

    self.head = Some(item_ptr);
    self.len += 1;
  }

  /// Unlinks an item from this list. Unlinked items are left alone, so the
  /// call is safe to repeat.
  pub fn remove(&mut self, item: &mut T) {
    let item_ptr = NonNull::from(&mut *item);

    if self.head == Some(item_ptr) {
      self.head = *item.link().next();
    } else if !item.link().is_linked() {
      return;
    }

    let link = item.link_mut();
    let next = link.next.take();
    let prev = link.prev.take();

    if let Some(mut prev) = prev {
      unsafe { prev.as_mut() }.link_mut().next = next;
    }
    if let Some(mut next) = next {
      unsafe { next.as_mut() }.link_mut().prev = prev;
    }

    self.len -= 1;
  }

  /// Unlinks and returns the first item.
  pub fn pop_front(&mut self) -> Option<NonNull<T>> {
    let mut first = self.head?;
    self.remove(unsafe { first.as_mut() });
    Some(first)
  }

  pub fn iter(&self) -> ListIter<'_, T> {
    ListIter {
      next: self.head,
      marker: PhantomData,
    }
  }
}

pub struct ListIter<'list, T>
where
  T: HasLink + 'list,
{
  next: Option<NonNull<T>>,
  marker: PhantomData<&'list T>,
}

impl<'list, T> Iterator for ListIter<'list, T>
where
  T: HasLink + 'list,
{
  type Item = &'list T;

  fn next(&mut self) -> Option<Self::Item> {
    let current = self.next?;
    let current_ref = unsafe { current.as_ref() };
    self.next = *current_ref.link().next();
    Some(current_ref)
  }
}
