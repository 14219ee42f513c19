//! Hierarchical binary container
//!
//! Groups nest other groups and hold named attributes and f32 datasets.
//! Format: MAGIC (4 bytes) + VERSION (u32 LE) + bincode(root group)

use std::collections::BTreeMap;
use std::io::{Read, Write};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Magic bytes identifying a likelihood grid file.
pub const MAGIC: &[u8; 4] = b"LHGR";

/// Current container format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    Str(String),
    Int(i64),
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::Str(value.to_string())
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::Int(value)
    }
}

/// N-dimensional f32 array stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl Dataset {
    /// Narrow a 1-D sequence to f32
    pub fn from_slice(values: &[f64]) -> Self {
        Self {
            shape: vec![values.len()],
            data: values.iter().map(|&v| v as f32).collect(),
        }
    }

    /// Narrow a 2-D grid to f32, row-major
    pub fn from_array2(values: &Array2<f64>) -> Self {
        let (rows, columns) = values.dim();
        Self {
            shape: vec![rows, columns],
            data: values.iter().map(|&v| v as f32).collect(),
        }
    }

    fn check(&self, name: &str, rank: usize) -> StorageResult<()> {
        if self.shape.len() != rank {
            return Err(StorageError::DatasetRank {
                name: name.to_string(),
                expected: rank,
                found: self.shape.len(),
            });
        }
        let expected = self
            .shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| StorageError::DatasetShape {
                name: name.to_string(),
                shape: self.shape.clone(),
            })?;
        if self.data.len() != expected {
            return Err(StorageError::DatasetLength {
                name: name.to_string(),
                expected,
                found: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn to_array1(&self, name: &str) -> StorageResult<Array1<f64>> {
        self.check(name, 1)?;
        Ok(self.data.iter().map(|&v| f64::from(v)).collect())
    }

    pub fn to_array2(&self, name: &str) -> StorageResult<Array2<f64>> {
        self.check(name, 2)?;
        let values = self.data.iter().map(|&v| f64::from(v)).collect();
        Array2::from_shape_vec((self.shape[0], self.shape[1]), values).map_err(|_| {
            StorageError::DatasetShape {
                name: name.to_string(),
                shape: self.shape.clone(),
            }
        })
    }
}

/// A named node of the container
///
/// Children are kept in key order, so insertion order is not preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(skip)]
    path: String,
    pub attrs: BTreeMap<String, Attribute>,
    pub datasets: BTreeMap<String, Dataset>,
    pub groups: BTreeMap<String, Group>,
}

impl Group {
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            ..Default::default()
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Create (or replace) a child group and return it
    pub fn create_group(&mut self, name: &str) -> &mut Group {
        let path = self.child_path(name);
        let slot = self.groups.entry(name.to_string()).or_default();
        *slot = Group {
            path,
            ..Default::default()
        };
        slot
    }

    pub fn create_dataset(&mut self, name: &str, dataset: Dataset) {
        self.datasets.insert(name.to_string(), dataset);
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<Attribute>) {
        self.attrs.insert(name.to_string(), value.into());
    }

    fn child_path(&self, name: &str) -> String {
        if self.path.ends_with('/') {
            format!("{}{name}", self.path)
        } else {
            format!("{}/{name}", self.path)
        }
    }

    pub fn group(&self, name: &str) -> StorageResult<&Group> {
        self.groups
            .get(name)
            .ok_or_else(|| StorageError::MissingGroup {
                path: self.child_path(name),
            })
    }

    pub fn dataset(&self, name: &str) -> StorageResult<&Dataset> {
        self.datasets
            .get(name)
            .ok_or_else(|| StorageError::MissingDataset {
                group: self.path.clone(),
                name: name.to_string(),
            })
    }

    fn attr(&self, name: &str) -> StorageResult<&Attribute> {
        self.attrs
            .get(name)
            .ok_or_else(|| StorageError::MissingAttribute {
                group: self.path.clone(),
                name: name.to_string(),
            })
    }

    fn attr_type_error(&self, name: &str, expected: &'static str) -> StorageError {
        StorageError::AttributeType {
            group: self.path.clone(),
            name: name.to_string(),
            expected,
        }
    }

    pub fn attr_str(&self, name: &str) -> StorageResult<&str> {
        match self.attr(name)? {
            Attribute::Str(value) => Ok(value),
            _ => Err(self.attr_type_error(name, "string")),
        }
    }

    pub fn attr_int(&self, name: &str) -> StorageResult<i64> {
        match self.attr(name)? {
            Attribute::Int(value) => Ok(*value),
            _ => Err(self.attr_type_error(name, "integer")),
        }
    }

    /// Restore `path` on every descendant after decoding
    fn assign_paths(&mut self) {
        let base = self.path.clone();
        for (name, child) in self.groups.iter_mut() {
            child.path = if base.ends_with('/') {
                format!("{base}{name}")
            } else {
                format!("{base}/{name}")
            };
            child.assign_paths();
        }
    }
}

/// Write `root` as a complete container
pub fn write_container<W: Write>(root: &Group, mut writer: W) -> StorageResult<()> {
    writer.write_all(MAGIC)?;
    writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
    bincode::serialize_into(&mut writer, root).map_err(StorageError::Encode)?;
    writer.flush()?;
    Ok(())
}

/// Read a container written by [`write_container`]
pub fn read_container<R: Read>(mut reader: R) -> StorageResult<Group> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(|_| StorageError::BadMagic)?;
    if &magic != MAGIC {
        return Err(StorageError::BadMagic);
    }

    let mut version = [0u8; 4];
    reader.read_exact(&mut version)?;
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let mut root: Group = bincode::deserialize_from(reader).map_err(StorageError::Decode)?;
    root.path = "/".to_string();
    root.assign_paths();
    Ok(root)
}
