//! Context contributions that do not come from `define` blocks.

use serde_json::{Map, Value};
use tale_annotate::ImplicitMarker;
use tale_block::PropertyValue;
use tale_context::{infer_font, merge_into, ContextBuilder, FILTERED_IMAGE, IMAGE};
use tale_ir::Selector;
use tracing::trace;

use crate::files::FileRegistry;

const FONT: &str = "font";
const FILTER: &str = "filter";

/// Register every asset file as a struct named after its stem. Font files
/// also contribute what their name says about the face.
pub(crate) fn populate_files(builder: &mut ContextBuilder<'_>, files: &FileRegistry) {
    for file in files.assets() {
        let Some(type_name) = file.type_name.as_deref() else {
            continue;
        };
        let mut metadata = file.metadata();
        if type_name == FONT {
            merge_into(&mut metadata, &infer_font(&file.name).to_json());
        }
        trace!(type_name, name = %file.name, "file struct");
        builder.add_file(type_name, &file.name, &metadata);
    }
}

/// The `filtered_image` struct implied by a `base~filter~...` reference.
pub(crate) fn implicit_struct(marker: &ImplicitMarker) -> Value {
    let image = PropertyValue::Reference(Selector::typed(&[IMAGE, FILTERED_IMAGE], &marker.base));
    let filters = PropertyValue::List(
        marker
            .filters
            .iter()
            .map(|filter| PropertyValue::Reference(Selector::typed(&[FILTER], filter.as_str())))
            .collect(),
    );
    let mut object = Map::new();
    object.insert("image".to_string(), image.to_json());
    object.insert("filters".to_string(), filters.to_json());
    Value::Object(object)
}

pub(crate) fn populate_implicits<'m>(
    builder: &mut ContextBuilder<'_>,
    markers: impl IntoIterator<Item = &'m ImplicitMarker>,
) {
    for marker in markers {
        builder.add_implicit(FILTERED_IMAGE, &marker.name, &implicit_struct(marker));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::FileInfo;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tale_context::{walk_filtered_image, Builtins, ChainResult};

    #[test]
    fn test_files_become_structs() {
        let builtins = Builtins::embedded_or_empty();
        let mut files = FileRegistry::new();
        files.add(FileInfo::new("img/hero.png"));
        files.add(FileInfo::new("fonts/Lora-BoldItalic.ttf"));
        files.add(FileInfo::new("notes.md"));
        let mut builder = ContextBuilder::new(&builtins);
        populate_files(&mut builder, &files);
        let context = builder.build();

        let hero = context.graph.get("image", "hero").cloned().unwrap_or_default();
        assert_eq!(hero["src"], json!("img/hero.png"));
        assert_eq!(hero["anchor"], json!("center"));

        let lora = context.graph.get("font", "Lora-BoldItalic").cloned().unwrap_or_default();
        assert_eq!(lora["family"], json!("Lora"));
        assert_eq!(lora["weight"], json!(700));
        assert_eq!(lora["style"], json!("italic"));
        assert_eq!(lora["stretch"], json!("normal"));
    }

    #[test]
    fn test_explicit_definition_beats_inferred_font() {
        let builtins = Builtins::embedded_or_empty();
        let mut files = FileRegistry::new();
        files.add(FileInfo::new("Lora-Bold.ttf"));
        let mut builder = ContextBuilder::new(&builtins);
        populate_files(&mut builder, &files);
        builder.define("font", "Lora-Bold", json!({"weight": 650}));
        let context = builder.build();
        let lora = context.graph.get("font", "Lora-Bold").cloned().unwrap_or_default();
        assert_eq!(lora["weight"], json!(650));
        assert_eq!(lora["family"], json!("Lora"));
    }

    #[test]
    fn test_implicit_filtered_image_walks_to_base() {
        let builtins = Builtins::embedded_or_empty();
        let Some(marker) = ImplicitMarker::parse("hero~blur~sepia") else {
            panic!("marker must parse");
        };
        let mut builder = ContextBuilder::new(&builtins);
        builder.define("image", "hero", json!({"src": "hero.png"}));
        populate_implicits(&mut builder, [&marker]);
        let context = builder.build();
        assert_eq!(
            walk_filtered_image(&context.graph, "hero~blur~sepia"),
            ChainResult::Image {
                base: "hero".to_string(),
                filters: vec!["blur".to_string(), "sepia".to_string()],
            }
        );
    }
}
