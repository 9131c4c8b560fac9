use plotly::Plot;
use serde_json::Value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Plotly)]
    fn newPlot(div_id: &str, data: JsValue, layout: JsValue);
}

fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    js_sys::JSON::parse(&value.to_string())
}

/// Draws `plot` into the element with id `div_id`.
///
/// Keys of `layout_patch` (shapes, annotations, ...) are merged into the
/// serialized layout. Values go through JSON so `None` reaches Plotly as
/// `null` and lines break instead of dropping to zero.
pub fn render_plot(div_id: &str, plot: &Plot, layout_patch: Value) {
    let mut figure: Value = match serde_json::from_str(&plot.to_json()) {
        Ok(figure) => figure,
        Err(e) => {
            log::error!("Failed to serialize plot {}: {}", div_id, e);
            return;
        }
    };

    if let Value::Object(patch) = layout_patch {
        for (key, value) in patch {
            figure["layout"][key.as_str()] = value;
        }
    }

    match (to_js(&figure["data"]), to_js(&figure["layout"])) {
        (Ok(data), Ok(layout)) => {
            log::trace!("Rendering plot {}", div_id);
            newPlot(div_id, data, layout);
        }
        _ => log::error!("Failed to convert plot {} for Plotly", div_id),
    }
}
