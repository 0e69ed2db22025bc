use anyhow::Result;

use super::{ParseContext, Parser};
use crate::constants::{ICON_OWN_NAMESPACE_TYPES, ICON_RENDERED_SIZE, ICON_TYPE_BLACKLIST};
use crate::dump::{Dump, DumpIcon};
use crate::entity::{Color, Combination, Icon, Layer, round3};

/// Turns the dumped icons into [`Icon`] entities and provides the lookup
/// table the other parsers resolve their icons with.
///
/// Icons of items, fluids, recipes and mods belong to their own namespace.
/// Icons of any other prototype type serve both the `item` and the `machine`
/// namespace, unless the name is already taken there.
pub struct IconParser;

impl IconParser {
    fn map_icon(dump_icon: &DumpIcon) -> Option<Icon> {
        let layers: Vec<Layer> = dump_icon
            .layers
            .iter()
            .map(|layer| Layer {
                file_name: layer.file.clone(),
                offset_x: layer.shift[0].round() as i32,
                offset_y: layer.shift[1].round() as i32,
                scale: round3(layer.scale),
                size: layer.size,
                tint: layer
                    .tint
                    .map(|tint| Color::normalized(tint.r, tint.g, tint.b, tint.a))
                    .unwrap_or_default(),
            })
            .collect();

        let size = layers.first()?.size;
        Some(Icon {
            size,
            rendered_size: ICON_RENDERED_SIZE,
            layers,
        })
    }
}

impl Parser for IconParser {
    fn prepare(&self, dump: &Dump, context: &mut ParseContext) -> Result<()> {
        let (own, other): (Vec<&DumpIcon>, Vec<&DumpIcon>) = dump
            .data_stage
            .icons
            .iter()
            .filter(|icon| !ICON_TYPE_BLACKLIST.contains(&icon.prototype_type.as_str()))
            .partition(|icon| ICON_OWN_NAMESPACE_TYPES.contains(&icon.prototype_type.as_str()));

        for dump_icon in own {
            if let Some(icon) = Self::map_icon(dump_icon) {
                let hash = icon.content_hash();
                context.register_icon(&dump_icon.prototype_type, &dump_icon.name, &hash);
                context.icons.insert(hash, icon);
            }
        }

        for dump_icon in other {
            if let Some(icon) = Self::map_icon(dump_icon) {
                let hash = icon.content_hash();
                let as_item = context.register_icon("item", &dump_icon.name, &hash);
                let as_machine = context.register_icon("machine", &dump_icon.name, &hash);
                if as_item || as_machine {
                    context.icons.insert(hash, icon);
                }
            }
        }

        Ok(())
    }

    fn parse(&self, _dump: &Dump, _combination: &mut Combination, _context: &mut ParseContext) -> Result<()> {
        Ok(())
    }

    fn validate(&self, _combination: &mut Combination, context: &mut ParseContext) -> Result<()> {
        let before = context.icons.len();
        context.icons.retain(|hash, _| context.used_icon_hashes.contains(hash));

        tracing::trace!(target: "parser", "Kept {} of {} icons", context.icons.len(), before);
        Ok(())
    }
}
