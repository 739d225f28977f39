use indexmap::IndexMap;

use crate::error::Location;
use crate::range::Interval;

/// Label name -> (defining line, current interval).
#[derive(Debug, Default, Clone)]
pub struct Labels(IndexMap<String, (Location, Interval)>);

impl Labels {
    pub fn new() -> Self {
        Labels(IndexMap::new())
    }

    /// Registers a label as unknown. Returns the previous definition if the
    /// name was already taken.
    pub fn insert(&mut self, name: String, location: Location) -> Option<Location> {
        if let Some((prev, _)) = self.0.get(&name) {
            return Some(prev.clone());
        }
        self.0.insert(name, (location, Interval::UNKNOWN));
        None
    }

    pub fn get(&self, name: &str) -> Option<Interval> {
        self.0.get(name).map(|(_, range)| *range)
    }

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.0.get(name).map(|(loc, _)| loc)
    }

    /// Stores a new interval, returning whether it differs from the old one.
    pub fn update(&mut self, name: &str, range: Interval) -> bool {
        match self.0.get_mut(name) {
            Some((_, cur)) if *cur != range => {
                *cur = range;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Interval)> {
        self.0.iter().map(|(name, (_, range))| (name, range))
    }
}

impl FromIterator<(String, Interval)> for Labels {
    fn from_iter<T: IntoIterator<Item = (String, Interval)>>(iter: T) -> Self {
        Labels(
            iter.into_iter()
                .map(|(name, range)| (name, (Location::new("", 0), range)))
                .collect(),
        )
    }
}
