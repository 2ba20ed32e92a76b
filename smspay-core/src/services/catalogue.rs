// src/services/catalogue.rs

use std::collections::HashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use smspay_common::models::Product;
use smspay_common::traits::purchase_traits::{MessageGenerator, ProductCatalogue};
use crate::Error;

/// Catalogue backed by the product list from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogue {
    products: HashMap<String, Product>,
}

impl StaticCatalogue {
    pub fn new(products: Vec<Product>) -> Result<Self, Error> {
        let mut map = HashMap::with_capacity(products.len());
        for p in products {
            if p.required_sms_count == 0 {
                return Err(Error::Config(format!(
                    "product '{}' must require at least one SMS",
                    p.product_id
                )));
            }
            if map.contains_key(&p.product_id) {
                return Err(Error::Config(format!("duplicate product id '{}'", p.product_id)));
            }
            map.insert(p.product_id.clone(), p);
        }
        Ok(Self { products: map })
    }
}

impl ProductCatalogue for StaticCatalogue {
    fn product(&self, product_id: &str) -> Option<Product> {
        self.products.get(product_id).cloned()
    }

    fn products(&self) -> Vec<Product> {
        let mut all: Vec<Product> = self.products.values().cloned().collect();
        all.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        all
    }
}

/// Plain-text message body: `<product> <n>/<total>`.
#[derive(Debug, Clone, Default)]
pub struct TemplateMessageGenerator;

impl MessageGenerator for TemplateMessageGenerator {
    fn generate(&self, product: &Product, total: u32, index: u32) -> String {
        format!("{} {}/{}", product.product_id, index + 1, total)
    }
}

/// Inclusive range destination numbers are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRange {
    pub start: u64,
    pub end: u64,
}

impl DestinationRange {
    pub fn new(start: u64, end: u64) -> Result<Self, Error> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.start > self.end {
            return Err(Error::Config(format!(
                "destination range start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> String {
        rng.random_range(self.start..=self.end).to_string()
    }
}
