//! The standard scene catalog
//!
//! Every site has a hub, an urban view and an exchange with buy and sell
//! screens. Sites with a security office also have an expulsion board;
//! sites with a guild also have an order board. Hubs are joined pairwise
//! by rail.

use super::{Edge, GraphBuildError, Rail, SceneGraphBuilder};
use crate::gesture::GestureBatch;
use crate::layout;
use crate::site::{Capability, Site};
use resonance_device::Point;

fn tap(point: Point) -> GestureBatch {
    GestureBatch::new().tap(point)
}

fn escape() -> GestureBatch {
    tap(layout::ESCAPE)
}

/// Builder pre-loaded with the standard catalog
///
/// Wiring order matters: hubs list their rails first, so a search leaving
/// a hub prefers the rail over walking into the city.
pub fn standard_builder() -> Result<SceneGraphBuilder, GraphBuildError> {
    let mut b = SceneGraphBuilder::new();

    let hubs = Site::ALL
        .into_iter()
        .map(|site| b.add_scene(site, Capability::Hub))
        .collect::<Result<Vec<_>, _>>()?;
    for (i, &from) in hubs.iter().enumerate() {
        for (j, &to) in hubs.iter().enumerate() {
            if i != j {
                b.add_edge(from, to, Edge::Rail(Rail::new(Site::ALL[i], Site::ALL[j])))?;
            }
        }
    }

    for (&site, &hub) in Site::ALL.iter().zip(&hubs) {
        let urban = b.add_scene(site, Capability::Urban)?;
        b.link(hub, urban, tap(layout::ENTER_URBAN), escape())?;

        if let Some(entrance) = layout::security_office_entrance(site) {
            let office = b.add_scene(site, Capability::SecurityOffice)?;
            b.link(urban, office, tap(entrance), escape())?;
            let board = b.add_scene(site, Capability::ExpulsionBoard)?;
            b.link(office, board, tap(layout::EXPULSION_TASK), escape())?;
        }

        let exchange = b.add_scene(site, Capability::Exchange)?;
        b.link(urban, exchange, tap(layout::exchange_entrance(site)), escape())?;
        let buy = b.add_scene(site, Capability::ExchangeBuy)?;
        b.link(exchange, buy, tap(layout::BUY), escape())?;
        let sell = b.add_scene(site, Capability::ExchangeSell)?;
        b.link(exchange, sell, tap(layout::SELL), escape())?;

        if let Some(entrance) = layout::guild_entrance(site) {
            let guild = b.add_scene(site, Capability::Guild)?;
            b.link(urban, guild, tap(entrance), escape())?;
            let board = b.add_scene(site, Capability::OrderBoard)?;
            b.link(guild, board, tap(layout::ORDER_BOARD), escape())?;
        }
    }

    Ok(b)
}
