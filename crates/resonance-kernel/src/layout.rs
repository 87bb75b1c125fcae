//! Fixed screen positions at the 1920x1080 reference resolution
#![allow(missing_docs)]

use crate::site::Site;
use resonance_device::{Point, Rect};

pub const ENTER_URBAN: Point = Point::new(1765, 750);
pub const ESCAPE: Point = Point::new(125, 55);
pub const MAP: Point = Point::new(1820, 1000);
pub const EMBARK: Point = Point::new(1607, 957);
pub const ARRIVAL: Point = Point::new(1338, 536);

// Security office
pub const EXPULSION_TASK: Point = Point::new(1425, 468);
pub const EXPULSION_SLOTS: [Point; 3] = [
    Point::new(942, 985),
    Point::new(1345, 985),
    Point::new(1742, 985),
];
pub const EXPULSION_START: Point = Point::new(1315, 807);
pub const BATTLE_CONFIRM: Point = Point::new(1800, 568);
pub const BATTLE_END_NEXT: Point = Point::new(1723, 940);

// Exchange
pub const BUY: Point = Point::new(1427, 485);
pub const SELL: Point = Point::new(1427, 608);
pub const SELL_SELECT: Point = Point::new(1015, 300);
pub const SELECT_ALL: Point = Point::new(1800, 150);
pub const CONFIRM_TRADE: Point = Point::new(1597, 979);
pub const LOCAL_ITEM_WARNING_CONFIRM: Point = Point::new(1412, 754);
pub const USE_ITEM_CONFIRM: Point = Point::new(1412, 754);
pub const USE_ITEM: Point = Point::new(1628, 162);
pub const NEGOTIATE: Point = Point::new(1747, 696);
pub const PURCHASE_BOOK: Point = Point::new(1386, 253);
pub const BLANK_SPACE: Point = Point::new(971, 1014);
pub const ITEM_PAGE_FROM: Point = Point::new(1210, 970);
pub const ITEM_PAGE_TO: Point = Point::new(1210, 285);

// Guild. Calibrated placeholders, not yet measured on a device.
pub const ORDER_BOARD: Point = Point::new(1452, 620);
pub const ORDER_CONFIRM: Point = Point::new(1412, 754);
pub const ORDER_PAGE_FROM: Point = Point::new(960, 900);
pub const ORDER_PAGE_TO: Point = Point::new(960, 300);

pub const STATION_NAME: Rect = Rect::new(1695, 747, 1844, 770);
pub const BATTLE_WIN: Rect = Rect::new(114, 632, 455, 720);
pub const EXPULSION_PROGRESS: [Rect; 3] = [
    Rect::new(1011, 980, 1079, 1026),
    Rect::new(1396, 980, 1464, 1026),
    Rect::new(1781, 980, 1849, 1026),
];
pub const ITEM_LIST: Rect = Rect::new(978, 227, 1263, 1025);
pub const ARRIVAL_LABEL: Rect = Rect::new(1262, 514, 1414, 559);
pub const PRICE_PERCENT: Rect = Rect::new(1488, 678, 1582, 711);
pub const PRICE_ACTION: Rect = Rect::new(1680, 672, 1750, 710);
/// Calibrated placeholder, not yet measured on a device
pub const ORDER_LIST: Rect = Rect::new(120, 160, 1800, 1000);

/// Exchange entrance on each site's urban view
#[must_use]
pub const fn exchange_entrance(site: Site) -> Point {
    match site {
        Site::Shoggolith => Point::new(1738, 512),
        Site::Brcl => Point::new(1523, 547),
        Site::Mander => Point::new(1539, 407),
        Site::Wilderness => Point::new(1477, 384),
        Site::Onederland => Point::new(1190, 472),
        Site::Clarity => Point::new(185, 618),
        Site::Freeport => Point::new(821, 383),
        Site::AnitaWeapon => Point::new(975, 234),
        Site::AnitaEnergy => Point::new(966, 459),
        Site::AnitaRocket => Point::new(765, 702),
    }
}

/// Security office entrance, for sites that have one
#[must_use]
pub const fn security_office_entrance(site: Site) -> Option<Point> {
    match site {
        Site::Shoggolith => Some(Point::new(503, 640)),
        Site::Mander => Some(Point::new(837, 589)),
        Site::Clarity => Some(Point::new(747, 193)),
        Site::Freeport => Some(Point::new(1354, 503)),
        _ => None,
    }
}

/// Guild entrance, for sites that have one
///
/// Calibrated placeholders, not yet measured on a device.
#[must_use]
pub const fn guild_entrance(site: Site) -> Option<Point> {
    match site {
        Site::Shoggolith => Some(Point::new(1262, 318)),
        Site::Brcl => Some(Point::new(1120, 402)),
        Site::Mander => Some(Point::new(1198, 705)),
        Site::Clarity => Some(Point::new(1510, 330)),
        Site::Freeport => Some(Point::new(1612, 688)),
        _ => None,
    }
}
