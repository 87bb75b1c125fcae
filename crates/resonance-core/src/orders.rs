//! Order board rows
//!
//! Text boxes detected on the board are grouped into rows by vertical
//! position. Only rows carrying an accept button are orders.

use resonance_device::Point;
use resonance_kernel::vision::TextBox;
use resonance_kernel::Site;
use serde::Serialize;
use std::fmt;

/// Label of the accept button on an order row
pub const ACCEPT_LABEL: &str = "接取";

/// Boxes whose centers are this close vertically share a row
pub const ROW_TOLERANCE: i32 = 24;

const PASSENGER_LABEL: &str = "乘客";

/// What an order transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    Passenger,
    Cargo,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passenger => f.write_str("passenger"),
            Self::Cargo => f.write_str("cargo"),
        }
    }
}

/// One acceptable order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderInfo {
    pub destination: Site,
    pub accept: Point,
    pub kind: OrderKind,
    /// Seats or cargo space the order occupies
    pub capacity: u32,
}

/// Extract orders from the boxes detected on one board page
///
/// Rows without an accept button, or without a recognizable destination,
/// are skipped. Rows are returned top to bottom.
#[must_use]
pub fn parse_orders(boxes: &[TextBox]) -> Vec<OrderInfo> {
    group_rows(boxes).iter().filter_map(|row| parse_row(row)).collect()
}

fn group_rows(boxes: &[TextBox]) -> Vec<Vec<&TextBox>> {
    let mut sorted: Vec<&TextBox> = boxes.iter().collect();
    sorted.sort_by_key(|b| (b.position.y, b.position.x));

    let mut rows: Vec<Vec<&TextBox>> = Vec::new();
    let mut anchor = i32::MIN;
    for b in sorted {
        match rows.last_mut() {
            Some(row) if b.position.y - anchor <= ROW_TOLERANCE => row.push(b),
            _ => {
                anchor = b.position.y;
                rows.push(vec![b]);
            }
        }
    }
    rows
}

fn parse_row(row: &[&TextBox]) -> Option<OrderInfo> {
    let accept = row.iter().find(|b| b.text.contains(ACCEPT_LABEL))?.position;
    let destination = row
        .iter()
        .find_map(|b| Site::ALL.into_iter().find(|s| b.text.contains(s.display_name())))?;
    let kind = if row.iter().any(|b| b.text.contains(PASSENGER_LABEL)) {
        OrderKind::Passenger
    } else {
        OrderKind::Cargo
    };
    let capacity = row
        .iter()
        .filter(|b| !b.text.contains(destination.display_name()))
        .find_map(|b| first_integer(&b.text))
        .unwrap_or(0);
    Some(OrderInfo {
        destination,
        accept,
        kind,
        capacity,
    })
}

fn first_integer(text: &str) -> Option<u32> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|s| !s.is_empty())
        .and_then(|digits| digits.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rows_become_orders() {
        let boxes = vec![
            TextBox::new(300, 212, "货物订单"),
            TextBox::new(600, 205, "曼德矿场"),
            TextBox::new(900, 210, "占用12"),
            TextBox::new(1600, 208, "接取"),
            TextBox::new(300, 402, "乘客订单"),
            TextBox::new(600, 398, "7号自由港"),
            TextBox::new(900, 400, "3人"),
            TextBox::new(1600, 405, "接取"),
        ];
        assert_eq!(
            parse_orders(&boxes),
            vec![
                OrderInfo {
                    destination: Site::Mander,
                    accept: Point::new(1600, 208),
                    kind: OrderKind::Cargo,
                    capacity: 12,
                },
                OrderInfo {
                    destination: Site::Freeport,
                    accept: Point::new(1600, 405),
                    kind: OrderKind::Passenger,
                    capacity: 3,
                },
            ]
        );
    }

    #[test]
    fn test_rows_without_accept_are_ignored() {
        let boxes = vec![
            TextBox::new(300, 200, "货物订单"),
            TextBox::new(600, 200, "荒原站"),
            TextBox::new(1600, 200, "接取"),
            TextBox::new(600, 500, "荒原站"),
            TextBox::new(900, 500, "5"),
        ];
        let orders = parse_orders(&boxes);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].capacity, 0);
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_orders(&[]).is_empty());
        assert!(parse_orders(&[TextBox::new(1, 1, "接取")]).is_empty());
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("占用12格"), Some(12));
        assert_eq!(first_integer("x3 y4"), Some(3));
        assert_eq!(first_integer("无"), None);
    }
}
