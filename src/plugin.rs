//! Named per-decoder alternatives.
//!
//! Some formats ship with game-specific parameters (obfuscation keys,
//! tables) that cannot be detected from the data.  A decoder keeps them in a
//! [`PluginSet`] and the caller picks one by name before decoding.
//!
//! # Selection rules
//! - An explicit [`PluginSet::set`] always wins.
//! - A set with exactly one plugin uses it implicitly.
//! - A set with several plugins and no selection refuses to guess.

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct Plugin<T> {
    name:  &'static str,
    value: T,
}

#[derive(Debug, Clone)]
pub struct PluginSet<T> {
    plugins:  Vec<Plugin<T>>,
    selected: Option<usize>,
}

impl<T> Default for PluginSet<T> {
    fn default() -> Self {
        Self { plugins: Vec::new(), selected: None }
    }
}

impl<T> PluginSet<T> {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, name: &'static str, value: T) {
        self.plugins.push(Plugin { name, value });
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name).collect()
    }

    pub fn is_empty(&self) -> bool { self.plugins.is_empty() }

    pub fn set(&mut self, name: &str) -> Result<()> {
        match self.plugins.iter().position(|p| p.name == name) {
            Some(idx) => {
                self.selected = Some(idx);
                Ok(())
            }
            None => Err(Error::unsupported(format!(
                "unknown plugin '{name}' (available: {})",
                self.names().join(", ")
            ))),
        }
    }

    /// The active plugin's value.
    pub fn get(&self) -> Result<&T> {
        if let Some(idx) = self.selected {
            return Ok(&self.plugins[idx].value);
        }
        match self.plugins.as_slice() {
            [only] => Ok(&only.value),
            []     => Err(Error::unsupported("no plugins available")),
            _      => Err(Error::unsupported(format!(
                "a plugin must be selected (available: {})",
                self.names().join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_plugin_is_implicit() {
        let mut set = PluginSet::new();
        set.add("snow", 1u8);
        assert_eq!(*set.get().unwrap(), 1);
    }

    #[test]
    fn several_plugins_need_selection() {
        let mut set = PluginSet::new();
        set.add("a", 1u8);
        set.add("b", 2u8);
        assert!(matches!(set.get(), Err(Error::UnsupportedFeature(_))));
        set.set("b").unwrap();
        assert_eq!(*set.get().unwrap(), 2);
        assert!(set.set("c").is_err());
        assert_eq!(*set.get().unwrap(), 2);
        assert_eq!(set.names(), vec!["a", "b"]);
    }

    #[test]
    fn empty_set_fails() {
        let set: PluginSet<u8> = PluginSet::new();
        assert!(set.is_empty());
        assert!(set.get().is_err());
    }
}
