use crate::{error::ComparisonError, model::City};

pub const MAX_COMPARISON_CITIES: usize = 3;

/// Cities picked for side-by-side comparison. Held in memory only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonSet {
    cities: Vec<City>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `city` unless the set is full or already holds that name.
    pub fn add(&mut self, city: City) -> Result<(), ComparisonError> {
        if self.cities.len() >= MAX_COMPARISON_CITIES {
            return Err(ComparisonError::Full { max: MAX_COMPARISON_CITIES });
        }
        if self.contains(&city.name) {
            return Err(ComparisonError::Duplicate(city.name));
        }
        self.cities.push(city);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<City, ComparisonError> {
        if index >= self.cities.len() {
            return Err(ComparisonError::OutOfRange { index, len: self.cities.len() });
        }
        Ok(self.cities.remove(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cities.iter().any(|c| c.name == name)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cities.len() >= MAX_COMPARISON_CITIES
    }
}
