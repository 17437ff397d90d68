//! Web Map Service client
//!
//! Fetches a GetCapabilities document and lists the named layers it offers,
//! so a page can let the user pick overlays from an arbitrary WMS endpoint.
//! Only `<Layer>` elements that carry a `<Name>` are listable; group layers
//! without a name exist purely for nesting and are skipped.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::errors::{WmsError, WmsResult};

/// One selectable WMS layer: the machine `name` goes into GetMap requests,
/// the human `title` into dropdowns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WmsLayer {
    pub name: String,
    pub title: String,
}

/// A WMS overlay for the map document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WmsLayerSpec {
    pub url: String,
    pub layer: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_transparent")]
    pub transparent: bool,
}

fn default_format() -> String {
    "image/png".to_string()
}

fn default_transparent() -> bool {
    true
}

impl WmsLayerSpec {
    pub fn new(url: &str, layer: &str) -> Self {
        Self {
            url: url.to_string(),
            layer: layer.to_string(),
            format: default_format(),
            transparent: default_transparent(),
        }
    }
}

/// Fetch and parse the capability listing of a WMS endpoint.
pub async fn get_wms_layers(http: &reqwest::Client, url: &str) -> WmsResult<Vec<WmsLayer>> {
    let capabilities_url = build_capabilities_url(url)?;
    let body = http
        .get(capabilities_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_capabilities(&body)
}

fn build_capabilities_url(url: &str) -> WmsResult<url::Url> {
    let mut parsed = url::Url::parse(url)
        .map_err(|e| WmsError::Capabilities(format!("invalid WMS URL: {}", e)))?;
    // Preserve any vendor query params already on the URL.
    let existing: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| {
            let k = k.to_lowercase();
            k != "service" && k != "request" && k != "version"
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(existing)
        .append_pair("service", "WMS")
        .append_pair("request", "GetCapabilities")
        .append_pair("version", "1.3.0");
    Ok(parsed)
}

/// Parse a capabilities document into `(name, title)` pairs, in document
/// order. Tolerates both WMS 1.1.1 and 1.3.0 layouts: we only walk
/// `<Layer>` nesting and read each layer's immediate `<Name>`/`<Title>`.
/// `<Name>` elements under other children (`<Style>`, `<Dimension>`, ...)
/// are ignored.
pub fn parse_capabilities(xml: &str) -> WmsResult<Vec<WmsLayer>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // (name, title) per open <Layer>, innermost last.
    let mut layer_stack: Vec<(Option<String>, Option<String>)> = Vec::new();
    // Local names of the currently open elements.
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut capture: Option<&'static str> = None;
    let mut layers = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = e.local_name().as_ref().to_vec();
                let in_layer = path.last().is_some_and(|p| p == b"Layer");
                match local.as_slice() {
                    b"Layer" => layer_stack.push((None, None)),
                    b"Name" if in_layer => capture = Some("name"),
                    b"Title" if in_layer => capture = Some("title"),
                    _ => {}
                }
                path.push(local);
            }
            Ok(Event::Text(t)) => {
                if let (Some(field), Some(top)) = (capture, layer_stack.last_mut()) {
                    let text = t
                        .unescape()
                        .map_err(|e| WmsError::Capabilities(e.to_string()))?
                        .into_owned();
                    match field {
                        "name" if top.0.is_none() => top.0 = Some(text),
                        "title" if top.1.is_none() => top.1 = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                path.pop();
                match e.local_name().as_ref() {
                    b"Layer" => {
                        if let Some((Some(name), title)) = layer_stack.pop() {
                            layers.push(WmsLayer {
                                title: title.unwrap_or_else(|| name.clone()),
                                name,
                            });
                        }
                    }
                    b"Name" | b"Title" => capture = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(WmsError::Capabilities(e.to_string())),
            _ => {}
        }
    }

    if layers.is_empty() {
        return Err(WmsError::Capabilities(
            "no named layers in capabilities document".to_string(),
        ));
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPABILITIES: &str = r#"<?xml version="1.0"?>
<WMS_Capabilities version="1.3.0">
  <Capability>
    <Layer>
      <Title>Root group</Title>
      <Layer>
        <Name>WORLDCOVER_2020_MAP</Name>
        <Title>ESA WorldCover 2020 map</Title>
      </Layer>
      <Layer>
        <Name>WORLDCOVER_2020_S2_TCC</Name>
        <Title>Sentinel-2 true color</Title>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

    #[test]
    fn lists_named_layers_and_skips_groups() {
        let layers = parse_capabilities(CAPABILITIES).unwrap();
        let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["WORLDCOVER_2020_MAP", "WORLDCOVER_2020_S2_TCC"]);
        assert_eq!(layers[0].title, "ESA WorldCover 2020 map");
    }

    #[test]
    fn layer_without_title_falls_back_to_name() {
        let xml = r#"<WMS_Capabilities><Capability>
            <Layer><Layer><Name>plain</Name></Layer></Layer>
        </Capability></WMS_Capabilities>"#;
        let layers = parse_capabilities(xml).unwrap();
        assert_eq!(layers[0].title, "plain");
    }

    #[test]
    fn style_names_do_not_leak_into_group_layers() {
        let xml = r#"<WMS_Capabilities><Capability>
            <Layer>
              <Title>Root group</Title>
              <Style><Name>default</Name><Title>Default style</Title></Style>
              <Layer>
                <Name>actual</Name>
                <Title>Actual layer</Title>
              </Layer>
            </Layer>
        </Capability></WMS_Capabilities>"#;
        let layers = parse_capabilities(xml).unwrap();
        let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["actual"]);
    }

    #[test]
    fn empty_document_is_an_error() {
        let xml = "<WMS_Capabilities><Capability/></WMS_Capabilities>";
        assert!(matches!(
            parse_capabilities(xml),
            Err(WmsError::Capabilities(_))
        ));
    }

    #[test]
    fn capabilities_url_keeps_vendor_params() {
        let url =
            build_capabilities_url("https://hydro.nationalmap.gov/arcgis/services/wbd/MapServer/WMSServer?map=wbd")
                .unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("map=wbd"));
        assert!(query.contains("request=GetCapabilities"));
    }
}
