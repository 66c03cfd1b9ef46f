use sinomerc_core::batch;
use sinomerc_core::{datum, DatumMode, GeoCoordinate, PlanarPoint, ProjectionConfig, SphericalMercator};
use wasm_bindgen::prelude::*;

/// Projection handle for the map widget. Built once from the host's datum
/// decision; every call after that is pure.
#[wasm_bindgen]
pub struct Projection {
    inner: SphericalMercator,
}

#[wasm_bindgen]
impl Projection {
    #[wasm_bindgen(constructor)]
    pub fn new(use_distorted_datum: bool) -> Projection {
        Projection { inner: SphericalMercator::new(DatumMode::from_flag(use_distorted_datum)) }
    }

    /// Build from a JSON config such as `{"useDistortedDatum": true}`.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(json: &str) -> Result<Projection, JsValue> {
        let config = ProjectionConfig::from_json(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Projection { inner: SphericalMercator::from_config(&config) })
    }

    #[wasm_bindgen(getter, js_name = useDistortedDatum)]
    pub fn use_distorted_datum(&self) -> bool {
        self.inner.mode().is_distorted()
    }

    /// `[x, y]` in meters.
    pub fn project(&self, lon: f64, lat: f64) -> Vec<f64> {
        let p = self.inner.project(GeoCoordinate::new(lon, lat));
        vec![p.x, p.y]
    }

    /// `[lon, lat]` in degrees.
    pub fn unproject(&self, x: f64, y: f64) -> Vec<f64> {
        let c = self.inner.unproject(PlanarPoint::new(x, y));
        vec![c.lon, c.lat]
    }

    /// Interleaved `[lon0, lat0, lon1, lat1, …]` → `[x0, y0, x1, y1, …]`.
    /// A trailing odd value is ignored.
    #[wasm_bindgen(js_name = projectMany)]
    pub fn project_many(&self, lonlat: &[f64]) -> Vec<f64> {
        let coords: Vec<GeoCoordinate> =
            lonlat.chunks_exact(2).map(|c| GeoCoordinate::new(c[0], c[1])).collect();
        batch::project_all(&self.inner, &coords)
            .into_iter()
            .flat_map(|p| [p.x, p.y])
            .collect()
    }

    /// Interleaved `[x0, y0, …]` → `[lon0, lat0, …]`.
    #[wasm_bindgen(js_name = unprojectMany)]
    pub fn unproject_many(&self, xy: &[f64]) -> Vec<f64> {
        let points: Vec<PlanarPoint> =
            xy.chunks_exact(2).map(|c| PlanarPoint::new(c[0], c[1])).collect();
        batch::unproject_all(&self.inner, &points)
            .into_iter()
            .flat_map(|c| [c.lon, c.lat])
            .collect()
    }

    /// Array of `{lon, lat}` objects → array of `{x, y}` objects.
    #[wasm_bindgen(js_name = projectObjects)]
    pub fn project_objects(&self, coords: JsValue) -> Result<JsValue, JsValue> {
        let coords: Vec<GeoCoordinate> = serde_wasm_bindgen::from_value(coords)
            .map_err(|e| JsValue::from_str(&format!("Invalid coordinates: {e}")))?;
        let points = batch::project_all(&self.inner, &coords);
        serde_wasm_bindgen::to_value(&points).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Plane extent as `[minX, minY, maxX, maxY]`.
    pub fn bounds(&self) -> Vec<f64> {
        let b = self.inner.bounds();
        vec![b.min.x, b.min.y, b.max.x, b.max.y]
    }
}

/// WGS-84 → GCJ-02 as `[lon, lat]`.
#[wasm_bindgen(js_name = toGcj02)]
pub fn to_gcj02(lon: f64, lat: f64) -> Vec<f64> {
    let c = datum::to_gcj02(GeoCoordinate::new(lon, lat));
    vec![c.lon, c.lat]
}

/// GCJ-02 → WGS-84 as `[lon, lat]`.
#[wasm_bindgen(js_name = toWgs84)]
pub fn to_wgs84(lon: f64, lat: f64) -> Vec<f64> {
    let c = datum::to_wgs84(GeoCoordinate::new(lon, lat));
    vec![c.lon, c.lat]
}

#[wasm_bindgen(js_name = outOfChina)]
pub fn out_of_china(lat: f64, lon: f64) -> bool {
    datum::out_of_china(lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_matches_core() {
        let proj = Projection::new(true);
        let core = SphericalMercator::new(DatumMode::Gcj02);
        let p = core.project(GeoCoordinate::new(116.3975, 39.9085));
        assert_eq!(proj.project(116.3975, 39.9085), vec![p.x, p.y]);
        assert!(proj.use_distorted_datum());
    }

    #[test]
    fn many_round_trips_and_drops_odd_tail() {
        let proj = Projection::new(true);
        let input = [116.3975, 39.9085, -73.9857, 40.7484, 5.0];
        let xy = proj.project_many(&input);
        assert_eq!(xy.len(), 4);
        let back = proj.unproject_many(&xy);
        for (a, b) in input[..4].iter().zip(&back) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn config_json_selects_mode() {
        let proj = Projection::from_config(r#"{"useDistortedDatum": false}"#).unwrap();
        assert!(!proj.use_distorted_datum());
        assert_eq!(proj.bounds()[2], sinomerc_core::mercator::BOUNDS.max.x);
    }

    #[test]
    fn free_functions_round_trip() {
        let gcj = to_gcj02(121.4737, 31.2304);
        let wgs = to_wgs84(gcj[0], gcj[1]);
        assert!((wgs[0] - 121.4737).abs() < 1e-6);
        assert!((wgs[1] - 31.2304).abs() < 1e-6);
        assert!(out_of_china(40.7484, -73.9857));
    }
}
