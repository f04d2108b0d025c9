//! Key/value bag handed to actors when they spawn.
//!
//! Map loading happens elsewhere; by the time parameters get here they are
//! already geometric primitives. Typed getters turn a missing or mistyped
//! key into a [`SpawnError`].

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::error::SpawnError;
use crate::combat::ActorId;
use crate::world::{Bounds, Facing};

/// One spawn parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Point(Vec2),
    Rect(Bounds),
    Path(Vec<Vec2>),
    Facing(Facing),
    Owner(ActorId),
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(value)
    }
}

impl From<Vec2> for ParamValue {
    fn from(value: Vec2) -> Self {
        ParamValue::Point(value)
    }
}

impl From<Bounds> for ParamValue {
    fn from(value: Bounds) -> Self {
        ParamValue::Rect(value)
    }
}

impl From<Vec<Vec2>> for ParamValue {
    fn from(value: Vec<Vec2>) -> Self {
        ParamValue::Path(value)
    }
}

impl From<Facing> for ParamValue {
    fn from(value: Facing) -> Self {
        ParamValue::Facing(value)
    }
}

impl From<ActorId> for ParamValue {
    fn from(value: ActorId) -> Self {
        ParamValue::Owner(value)
    }
}

/// Spawn parameters, ordered by key so prefixed groups iterate predictably.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnParams {
    values: BTreeMap<String, ParamValue>,
}

macro_rules! typed_getter {
    ($required:ident, $optional:ident, $variant:ident, $ty:ty, $expected:literal) => {
        pub fn $optional(&self, key: &str) -> Option<$ty> {
            match self.values.get(key) {
                Some(ParamValue::$variant(value)) => Some(value.clone()),
                _ => None,
            }
        }

        pub fn $required(&self, key: &str) -> Result<$ty, SpawnError> {
            match self.values.get(key) {
                Some(ParamValue::$variant(value)) => Ok(value.clone()),
                Some(_) => Err(SpawnError::WrongType {
                    key: key.to_string(),
                    expected: $expected,
                }),
                None => Err(SpawnError::MissingParam(key.to_string())),
            }
        }
    };
}

impl SpawnParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    typed_getter!(require_rect, rect, Rect, Bounds, "a rectangle");
    typed_getter!(require_point, point, Point, Vec2, "a point");
    typed_getter!(require_path, path, Path, Vec<Vec2>, "a path");
    typed_getter!(require_float, float, Float, f32, "a number");
    typed_getter!(require_bool, flag, Bool, bool, "a bool");

    pub fn facing(&self, key: &str) -> Option<Facing> {
        match self.values.get(key) {
            Some(ParamValue::Facing(facing)) => Some(*facing),
            _ => None,
        }
    }

    pub fn owner(&self, key: &str) -> Option<ActorId> {
        match self.values.get(key) {
            Some(ParamValue::Owner(owner)) => Some(*owner),
            _ => None,
        }
    }

    pub fn seed(&self) -> Option<u64> {
        match self.values.get("seed") {
            Some(ParamValue::Int(seed)) => Some(*seed as u64),
            _ => None,
        }
    }

    /// Entries whose key starts with `prefix`, in key order.
    pub fn prefixed<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a ParamValue)> {
        self.values
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn rects_with_prefix(&self, prefix: &str) -> Vec<Bounds> {
        self.prefixed(prefix)
            .filter_map(|(_, value)| match value {
                ParamValue::Rect(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn paths_with_prefix(&self, prefix: &str) -> Vec<Vec<Vec2>> {
        self.prefixed(prefix)
            .filter_map(|(_, value)| match value {
                ParamValue::Path(path) if !path.is_empty() => Some(path.clone()),
                _ => None,
            })
            .collect()
    }
}
