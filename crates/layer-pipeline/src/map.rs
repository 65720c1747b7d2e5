//! Map composition.

use tile_protocol::TileSource;

use crate::state::LayerStatus;

/// Tile sources of visible, ready layers, in layer-list order.
///
/// Layers higher in the list draw on top: each source is placed beneath the
/// visible source listed before it.
pub fn visible_tile_sources<'a, I>(statuses: I) -> Vec<TileSource>
where
    I: IntoIterator<Item = &'a LayerStatus>,
{
    let mut sources: Vec<TileSource> = Vec::new();
    for source in statuses.into_iter().filter_map(LayerStatus::tile_source) {
        let source = match sources.last() {
            Some(above) => source.clone().before(above.id.to_string()),
            None => source.clone(),
        };
        sources.push(source);
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LayerState;
    use explorer_common::{LayerId, RenderSpec};

    fn status(id: &str, visible: bool, ready: bool) -> LayerStatus {
        let state = if ready {
            let source =
                TileSource::new(LayerId::new(id), "https://tiler/t", &RenderSpec::default(), "u");
            LayerState::Ready { source }
        } else {
            LayerState::Resolving
        };
        LayerStatus::new(LayerId::new(id), visible, state)
    }

    #[test]
    fn test_only_visible_ready_layers_in_order() {
        let statuses = vec![
            status("c", true, true),
            status("a", false, true),
            status("b", true, false),
            status("d", true, true),
        ];
        let ids: Vec<String> = visible_tile_sources(&statuses)
            .into_iter()
            .map(|s| s.id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "d"]);
    }

    #[test]
    fn test_later_layers_draw_beneath_earlier_ones() {
        let statuses = vec![
            status("top", true, true),
            status("hidden", false, true),
            status("middle", true, true),
            status("bottom", true, true),
        ];
        let before: Vec<Option<String>> = visible_tile_sources(&statuses)
            .into_iter()
            .map(|s| s.before_id)
            .collect();
        assert_eq!(
            before,
            vec![None, Some("top".to_string()), Some("middle".to_string())]
        );
    }
}
