use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use lb_utils::hash::HashMap;

use super::{Provider, ValueRead, ValueWrite};
use crate::types::ResolvedType;

/// A [`Provider`] with handlers registered by class name.
///
/// Matches the erased class only, so `Vec<String>` and `Vec<i32>` share the
/// handlers registered for `Vec`.
#[derive(Clone, Default)]
pub struct SimpleProvider {
    readers: HashMap<Cow<'static, str>, Arc<dyn ValueRead>>,
    writers: HashMap<Cow<'static, str>, Arc<dyn ValueWrite>>,
}

impl SimpleProvider {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reader(
        mut self,
        class: impl Into<Cow<'static, str>>,
        reader: impl ValueRead,
    ) -> Self {
        self.readers.insert(class.into(), Arc::new(reader));
        self
    }

    pub fn with_writer(
        mut self,
        class: impl Into<Cow<'static, str>>,
        writer: impl ValueWrite,
    ) -> Self {
        self.writers.insert(class.into(), Arc::new(writer));
        self
    }
}

impl Provider for SimpleProvider {
    fn find_reader(&self, ty: &ResolvedType) -> Option<Arc<dyn ValueRead>> {
        self.readers.get(ty.class_name()).cloned()
    }

    fn find_writer(&self, ty: &ResolvedType) -> Option<Arc<dyn ValueWrite>> {
        self.writers.get(ty.class_name()).cloned()
    }
}

impl fmt::Debug for SimpleProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleProvider")
            .field("readers", &self.readers.keys().collect::<Vec<_>>())
            .field("writers", &self.writers.keys().collect::<Vec<_>>())
            .finish()
    }
}
