//! Property registry: the fixed, ordered set of animatable style properties.
//!
//! Transform-like properties come first (they render into a `transform` list and
//! the rotation family carries an angular unit), followed by the remaining
//! properties (currently only opacity).

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::TimelineError;

/// Number of registered properties.
pub const PROPERTY_COUNT: usize = 9;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    TranslateX,
    TranslateY,
    Rotate,
    RotateX,
    RotateY,
    Scale,
    ScaleX,
    ScaleY,
    Opacity,
}

pub const TRANSFORM_PROPERTIES: [Property; 8] = [
    Property::TranslateX,
    Property::TranslateY,
    Property::Rotate,
    Property::RotateX,
    Property::RotateY,
    Property::Scale,
    Property::ScaleX,
    Property::ScaleY,
];

pub const OTHER_PROPERTIES: [Property; 1] = [Property::Opacity];

/// Registry order: transform properties, then the others.
pub const ALL_PROPERTIES: [Property; PROPERTY_COUNT] = [
    Property::TranslateX,
    Property::TranslateY,
    Property::Rotate,
    Property::RotateX,
    Property::RotateY,
    Property::Scale,
    Property::ScaleX,
    Property::ScaleY,
    Property::Opacity,
];

impl Property {
    /// Style name as consumed by the rendering layer.
    pub fn name(self) -> &'static str {
        match self {
            Property::TranslateX => "translateX",
            Property::TranslateY => "translateY",
            Property::Rotate => "rotate",
            Property::RotateX => "rotateX",
            Property::RotateY => "rotateY",
            Property::Scale => "scale",
            Property::ScaleX => "scaleX",
            Property::ScaleY => "scaleY",
            Property::Opacity => "opacity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL_PROPERTIES.iter().copied().find(|p| p.name() == name)
    }

    /// Dense position in the registry.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn is_transform(self) -> bool {
        !matches!(self, Property::Opacity)
    }

    /// Rotation family values render with an angular unit suffix.
    #[inline]
    pub fn is_rotation(self) -> bool {
        matches!(self, Property::Rotate | Property::RotateX | Property::RotateY)
    }

    #[inline]
    pub fn is_scale(self) -> bool {
        matches!(self, Property::Scale | Property::ScaleX | Property::ScaleY)
    }

    /// Seed value used when no initial value is supplied.
    pub fn default_seed(self) -> f32 {
        if self.is_scale() || self == Property::Opacity {
            1.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::from_name(s).ok_or_else(|| TimelineError::UnknownProperty {
            name: s.to_string(),
        })
    }
}

/// Dense table holding exactly one entry per registered property.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyMap<T>([T; PROPERTY_COUNT]);

impl<T> PropertyMap<T> {
    pub fn from_fn(mut f: impl FnMut(Property) -> T) -> Self {
        Self(std::array::from_fn(|i| f(ALL_PROPERTIES[i])))
    }

    #[inline]
    pub fn get(&self, property: Property) -> &T {
        &self.0[property.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, property: Property) -> &mut T {
        &mut self.0[property.index()]
    }

    /// Iterate entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, &T)> {
        ALL_PROPERTIES.iter().copied().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(Property, &T) -> U) -> PropertyMap<U> {
        PropertyMap::from_fn(|p| f(p, self.get(p)))
    }
}

impl<T: Default> Default for PropertyMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Property> for PropertyMap<T> {
    type Output = T;

    fn index(&self, property: Property) -> &T {
        self.get(property)
    }
}

impl<T> IndexMut<Property> for PropertyMap<T> {
    fn index_mut(&mut self, property: Property) -> &mut T {
        self.get_mut(property)
    }
}

impl<T: Serialize> Serialize for PropertyMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(PROPERTY_COUNT))?;
        for (property, value) in self.iter() {
            map.serialize_entry(property.name(), value)?;
        }
        map.end()
    }
}
