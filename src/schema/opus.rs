//! `<opus>` link schema

use serde_json::Value;

use super::fields::RecordReader;
use super::ValidationError;
use crate::models::{ElementKind, LinkActuate, LinkShow, Opus};

pub fn opus(raw: &Value) -> Result<Opus, Vec<ValidationError>> {
    let mut r = RecordReader::new(ElementKind::Opus, raw)?;

    let href = r.required_string("href");
    let title = r.string("title");
    let show = r.keyword::<LinkShow>("show");
    let actuate = r.keyword::<LinkActuate>("actuate");

    match href {
        Some(href) => r.finish(Opus {
            href,
            title,
            show,
            actuate,
        }),
        None => r.reject(),
    }
}
