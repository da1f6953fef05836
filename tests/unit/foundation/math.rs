use super::*;

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = vec![200u8, 100, 50, 0, 200, 100, 50, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0, 200, 100, 50, 255]);
}

#[test]
fn premultiply_then_unpremultiply_is_close() {
    let mut px = vec![200u8, 100, 50, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![100, 50, 25, 128]);
    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px.iter().zip([200u8, 100, 50, 128]) {
        assert!((i32::from(*got) - i32::from(want)).abs() <= 2);
    }
}
