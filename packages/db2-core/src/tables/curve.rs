use super::db2_table;

db2_table! {
    /// Piecewise function header; `kind` selects the interpolation family.
    pub struct CurveEntry("Curve") {
        id: u32,
        kind: u8,
        flags: u8,
    }
}

db2_table! {
    pub struct CurvePointEntry("CurvePoint") {
        id: u32,
        pos: [f32; 2],
        pos_pre_squish: [f32; 2],
        curve_id: u16,
        order_index: u8,
    }
}
