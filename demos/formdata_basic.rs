//! Example of building a multipart/form-data body

use emx_formdata::{FormData, Boundary, Encoder};

fn main() -> anyhow::Result<()> {
    println!("=== Form Data Example ===\n");

    let mut form = FormData::new();

    // Scalar fields
    form.append("user", "Bob");
    form.append("age", 42);
    form.append("ratio", 0.75);
    form.append("subscribed", true);

    // Simulated PNG header as an in-memory attachment
    let png_header = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    form.append_file_bytes("avatar", png_header, "avatar.png");

    // A file on disk; registration reports failure instead of panicking
    if !form.append_file("manifest", "Cargo.toml", None) {
        println!("(Cargo.toml not found, skipping)");
    }

    // Fixed boundary so the output is stable
    let boundary = Boundary::new("ExampleBoundary")?;
    let body = Encoder::new().encode_form_with_boundary(&form, boundary);

    println!("Content-Type: {}", body.content_type());
    println!("---");
    println!("{}", String::from_utf8_lossy(body.buffer()));
    println!("---");
    println!("\n{} parts, {} bytes", form.len(), body.buffer().len());

    // Random boundary: two encodes share everything but the boundary
    let first = form.encode();
    let second = form.encode();
    assert_ne!(first.boundary(), second.boundary());
    println!("Random boundaries: {} / {}", first.boundary(), second.boundary());

    Ok(())
}
