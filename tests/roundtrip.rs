mod common;

use std::io::Cursor;

use bmpparser::{
    decode::load_pixel_array,
    encode::{copy_headers, encode, write_transformation, write_transformation_to_path},
    header::total_header_size,
    Bmp, Channel, Pixel, PixelGrid,
};
use common::{gradient, BmpBuilder};

#[test]
fn roundtrip_various_widths() {
    for width in 1..=9 {
        for height in [1, 2, 5, -1, -3] {
            let data = BmpBuilder::new(width, height).build();
            let grid = load_pixel_array(&mut Cursor::new(&data[..])).unwrap();
            assert_eq!(grid.width(), width as usize);
            assert_eq!(grid.height(), height.unsigned_abs() as usize);

            let encoded = encode(&mut Cursor::new(&data[..]), &grid).unwrap();
            assert_eq!(encoded, data, "{}x{}", width, height);
        }
    }
}

#[test]
fn roundtrip_larger_dib_headers() {
    for dib_header_size in [40, 52, 56, 108, 124] {
        let data = BmpBuilder::new(3, 2)
            .dib_header_size(dib_header_size)
            .build();
        assert_eq!(
            total_header_size(&mut Cursor::new(&data[..])).unwrap(),
            14 + u64::from(dib_header_size)
        );

        let bmp = Bmp::from_slice(&data).unwrap();
        assert_eq!(bmp.to_vec().unwrap(), data);
    }
}

#[test]
fn roundtrip_keeps_gap_after_header() {
    let gap = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02];
    let data = BmpBuilder::new(5, 3).gap(&gap).build();

    let headers = copy_headers(&mut Cursor::new(&data[..])).unwrap();
    assert_eq!(headers, &data[..54]);

    let bmp = Bmp::from_slice(&data).unwrap();
    assert_eq!(bmp.header_prefix(), &data[..60]);
    assert_eq!(bmp.to_vec().unwrap(), data);
}

#[test]
fn encode_normalizes_padding() {
    let data = BmpBuilder::new(1, 2).pad_byte(0xAA).build();
    let grid = load_pixel_array(&mut Cursor::new(&data[..])).unwrap();

    let encoded = encode(&mut Cursor::new(&data[..]), &grid).unwrap();
    assert_eq!(encoded, BmpBuilder::new(1, 2).build());
}

#[test]
fn two_pixel_image() {
    let data = BmpBuilder::new(2, 1).build_with(|_, column| {
        if column == 0 {
            Pixel::new(0, 0, 255)
        } else {
            Pixel::new(0, 255, 0)
        }
    });
    assert_eq!(&data[54..60], &[0, 0, 255, 0, 255, 0]);

    let grid = load_pixel_array(&mut Cursor::new(&data[..])).unwrap();
    assert_eq!(grid.height(), 1);
    assert_eq!(grid.width(), 2);

    let first = grid.get(0, 0).unwrap();
    assert_eq!(
        (first[Channel::Blue], first[Channel::Green], first[Channel::Red]),
        (0, 0, 255)
    );
    let second = grid.get(0, 1).unwrap();
    assert_eq!(
        (second[Channel::Blue], second[Channel::Green], second[Channel::Red]),
        (0, 255, 0)
    );
}

#[test]
fn grid_row_zero_is_bottom_scanline() {
    // In a top-down file the first stored row is the top scanline.
    let top_down = BmpBuilder::new(2, -3).build();
    let grid = load_pixel_array(&mut Cursor::new(&top_down[..])).unwrap();
    assert_eq!(grid.get(0, 1), Some(gradient(2, 1)));
    assert_eq!(grid.get(2, 1), Some(gradient(0, 1)));

    let bottom_up = BmpBuilder::new(2, 3).build();
    let grid = load_pixel_array(&mut Cursor::new(&bottom_up[..])).unwrap();
    assert_eq!(grid.get(0, 1), Some(gradient(0, 1)));
    assert_eq!(grid.get(2, 1), Some(gradient(2, 1)));
}

#[test]
fn modified_grid_is_written() {
    let data = BmpBuilder::new(3, 2).build();
    let mut grid = load_pixel_array(&mut Cursor::new(&data[..])).unwrap();
    for row in grid.rows_mut() {
        for pixel in row {
            *pixel = Pixel::new(pixel.red, pixel.green, pixel.blue);
        }
    }

    let mut output = Vec::new();
    write_transformation(&mut Cursor::new(&data[..]), &grid, &mut output).unwrap();

    let expected = BmpBuilder::new(3, 2).build_with(|row, column| {
        let p = gradient(row, column);
        Pixel::new(p.red, p.green, p.blue)
    });
    assert_eq!(output, expected);
}

#[test]
fn grid_from_rows_encodes() {
    let data = BmpBuilder::new(2, 2).build();
    let rows = vec![
        vec![Pixel::new(1, 1, 1), Pixel::new(2, 2, 2)],
        vec![Pixel::new(3, 3, 3), Pixel::new(4, 4, 4)],
    ];
    let grid = PixelGrid::from_rows(rows).unwrap();
    let encoded = encode(&mut Cursor::new(&data[..]), &grid).unwrap();
    assert_eq!(
        &encoded[54..],
        &[1, 1, 1, 2, 2, 2, 0, 0, 3, 3, 3, 4, 4, 4, 0, 0]
    );
}

#[test]
fn write_to_path() {
    let data = BmpBuilder::new(4, 4).build();
    let grid = load_pixel_array(&mut Cursor::new(&data[..])).unwrap();

    let path = std::env::temp_dir().join(format!(
        "bmpparser-roundtrip-{}.bmp",
        std::process::id()
    ));
    write_transformation_to_path(&mut Cursor::new(&data[..]), &grid, &path).unwrap();
    let written = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(written, data);

    let bmp = Bmp::from_slice(&data).unwrap();
    bmp.save(&path).unwrap();
    let reopened = Bmp::open(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(reopened, bmp);
}
