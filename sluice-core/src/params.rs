use crate::Value;
use std::borrow::Cow;

/// A parameter bound to a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Marker name as written in the SQL text (e.g. `@0`, `$1`, `:p`).
    pub name: Cow<'static, str>,
    pub value: Value,
}

/// Ordered parameter list of a statement, the order matches the first
/// occurrence of each marker in the SQL text.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Params {
    params: Vec<Param>,
}

impl Params {
    pub fn new() -> Self {
        Default::default()
    }
    /// Append a parameter and return its index.
    pub fn push(&mut self, name: impl Into<Cow<'static, str>>, value: Value) -> usize {
        self.params.push(Param {
            name: name.into(),
            value,
        });
        self.params.len() - 1
    }
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
    pub fn len(&self) -> usize {
        self.params.len()
    }
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Param> {
        self.params.iter()
    }
    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> {
        self.params.iter().map(|p| &p.value)
    }
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_ref())
    }
    pub fn into_values(self) -> Vec<Value> {
        self.params.into_iter().map(|p| p.value).collect()
    }
}

impl IntoIterator for Params {
    type Item = Param;
    type IntoIter = std::vec::IntoIter<Param>;
    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;
    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
