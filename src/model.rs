//! Post / Comment records as produced by the fetch side.
//! Unknown fields are ignored; missing required fields fail the parse.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    pub body: String,
    #[serde(deserialize_with = "epoch_seconds")]
    pub created_utc: i64,
    pub score: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(deserialize_with = "epoch_seconds")]
    pub created_utc: i64,
    pub score: i64,
    pub comments: Vec<Comment>,
}

/// Reddit dumps carry `created_utc` as either an integer or a float ("1136074600.0").
fn epoch_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Epoch {
        Int(i64),
        Float(f64),
    }
    match Epoch::deserialize(deserializer)? {
        Epoch::Int(v) => Ok(v),
        Epoch::Float(v) if v.is_finite() && v.abs() < i64::MAX as f64 => Ok(v.floor() as i64),
        Epoch::Float(v) => Err(serde::de::Error::custom(format!("created_utc out of range: {}", v))),
    }
}
