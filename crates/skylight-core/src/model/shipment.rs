// ── Shipment domain types ──

use serde::{Deserialize, Serialize};

/// Tag the tracker assigns once a parcel has arrived.
pub const DELIVERED_TAG: &str = "Delivered";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentCheckpoint {
    pub time: Option<String>,
    pub message: String,
    pub location: Option<String>,
}

/// One tracked parcel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub tag: String,
    pub slug: String,
    pub expected_delivery: Option<String>,
    pub tracking_number: String,
    pub title: Option<String>,
    /// Oldest first, as reported by the tracker.
    pub checkpoints: Vec<ShipmentCheckpoint>,
}

impl Shipment {
    pub fn is_delivered(&self) -> bool {
        self.tag == DELIVERED_TAG
    }

    /// Title, falling back to the tracking number.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.tracking_number)
    }

    /// Tag split at case boundaries: `OutForDelivery` -> `Out for delivery`.
    pub fn status_label(&self) -> String {
        let mut label = String::with_capacity(self.tag.len() + 4);
        for (i, ch) in self.tag.chars().enumerate() {
            if i > 0 && ch.is_ascii_uppercase() {
                label.push(' ');
                label.push(ch.to_ascii_lowercase());
            } else {
                label.push(ch);
            }
        }
        label
    }

    pub fn latest_checkpoint(&self) -> Option<&ShipmentCheckpoint> {
        self.checkpoints.last()
    }
}

/// Cached tracker response plus the derived active view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentBoard {
    all: Vec<Shipment>,
}

impl ShipmentBoard {
    pub fn new(all: Vec<Shipment>) -> Self {
        Self { all }
    }

    /// Cache indices of shipments that have not been delivered, in cache
    /// order.
    pub fn active_indices(&self) -> Vec<usize> {
        self.all
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_delivered())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn active(&self) -> impl Iterator<Item = &Shipment> {
        self.all.iter().filter(|s| !s.is_delivered())
    }

    pub fn active_label(&self) -> String {
        format!("{} active", self.active().count())
    }

    /// Address the cache by index (detail view).
    pub fn get(&self, index: usize) -> Option<&Shipment> {
        self.all.get(index)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipment(id: &str, tag: &str) -> Shipment {
        Shipment {
            id: id.into(),
            tag: tag.into(),
            tracking_number: format!("TN-{id}"),
            ..Shipment::default()
        }
    }

    #[test]
    fn active_view_drops_delivered() {
        let board = ShipmentBoard::new(vec![
            shipment("a", "InTransit"),
            shipment("b", "Delivered"),
        ]);
        let active: Vec<_> = board.active().map(|s| s.id.as_str()).collect();
        assert_eq!(active, vec!["a"]);
        assert_eq!(board.active_label(), "1 active");
        assert_eq!(board.active_indices(), vec![0]);
    }

    #[test]
    fn detail_addresses_full_cache() {
        let board = ShipmentBoard::new(vec![
            shipment("a", "Delivered"),
            shipment("b", "OutForDelivery"),
        ]);
        let idx = board.active_indices()[0];
        assert_eq!(board.get(idx).map(|s| s.id.as_str()), Some("b"));
        assert_eq!(board.get(idx).map(Shipment::status_label).as_deref(), Some("Out for delivery"));
    }

    #[test]
    fn display_name_falls_back_to_tracking_number() {
        let s = shipment("a", "Pending");
        assert_eq!(s.display_name(), "TN-a");
    }
}
