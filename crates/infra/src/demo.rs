//! Sample catalogue for development and the demo binary.

use chrono::Utc;

use inventrack_core::{CategoryId, DomainResult, LocationId};
use inventrack_inventory::{Category, Location, Money, NewItem, Sku};

use crate::error::InventoryError;
use crate::serializer::MutationSerializer;
use crate::store::InventoryStore;

const CATEGORIES: [&str; 4] = ["Electronics", "Accessories", "Furniture", "Office Supplies"];
const LOCATIONS: [&str; 4] = ["Warehouse A", "Warehouse B", "Office Storage", "Front Shelf"];

struct SampleItem {
    name: &'static str,
    sku: &'static str,
    description: &'static str,
    category: usize,
    location: usize,
    quantity: i64,
    price_cents: u64,
    threshold: i64,
    barcode: &'static str,
}

const ITEMS: [SampleItem; 5] = [
    SampleItem {
        name: "Wireless Keyboard",
        sku: "KB-WL001",
        description: "Bluetooth wireless keyboard",
        category: 0,
        location: 0,
        quantity: 24,
        price_cents: 4599,
        threshold: 10,
        barcode: "123456789012",
    },
    SampleItem {
        name: "USB-C Cable",
        sku: "CA-UC100",
        description: "USB-C to USB-A charging cable",
        category: 1,
        location: 3,
        quantity: 8,
        price_cents: 1250,
        threshold: 15,
        barcode: "223456789012",
    },
    SampleItem {
        name: "Desk Lamp",
        sku: "LT-DK220",
        description: "Adjustable LED desk lamp",
        category: 2,
        location: 2,
        quantity: 32,
        price_cents: 2999,
        threshold: 10,
        barcode: "323456789012",
    },
    SampleItem {
        name: "Wireless Mouse",
        sku: "MS-WL200",
        description: "Wireless optical mouse",
        category: 0,
        location: 3,
        quantity: 5,
        price_cents: 2299,
        threshold: 8,
        barcode: "423456789012",
    },
    SampleItem {
        name: "HDMI Adapter",
        sku: "AD-HD001",
        description: "HDMI to USB-C adapter",
        category: 1,
        location: 1,
        quantity: 3,
        price_cents: 1850,
        threshold: 10,
        barcode: "523456789012",
    },
];

/// Seed the default categories, locations and five sample items.
pub fn seed<S: InventoryStore>(serializer: &MutationSerializer<S>) -> Result<(), InventoryError> {
    let store = serializer.store();

    let categories = CATEGORIES
        .iter()
        .map(|name| Category::new(CategoryId::new(), name))
        .collect::<DomainResult<Vec<_>>>()?;
    let locations = LOCATIONS
        .iter()
        .map(|name| Location::new(LocationId::new(), name))
        .collect::<DomainResult<Vec<_>>>()?;

    for c in &categories {
        store.insert_category(c.clone())?;
    }
    for l in &locations {
        store.insert_location(l.clone())?;
    }

    for sample in &ITEMS {
        let mut new = NewItem::new(sample.name, Sku::parse(sample.sku)?);
        new.description = Some(sample.description.to_string());
        new.category_id = Some(categories[sample.category].id_typed());
        new.location_id = Some(locations[sample.location].id_typed());
        new.quantity = sample.quantity;
        new.price = Some(Money::from_cents(sample.price_cents));
        new.low_stock_threshold = Some(sample.threshold);
        new.barcode = Some(sample.barcode.to_string());
        serializer.insert(new, Utc::now())?;
    }

    tracing::info!(
        categories = categories.len(),
        locations = locations.len(),
        items = ITEMS.len(),
        "seeded demo inventory"
    );
    Ok(())
}
