use motley_hashes::{HashAccumulator, MD5Accumulator, SHA256Accumulator};

const DATA: &str = "Data to hash.";

/// Hash two chunks of text with the accumulator ``H`` and render the hexdigest.
fn hash_value<H: HashAccumulator>() -> String {
    let mut hash = H::default();
    hash.append(DATA.as_bytes());
    hash.append(b"You can continue to append more data.");
    hash.hexdigest()
}

fn main() {
    println!("\nmotley_hashes demo.\n");

    println!("   MD5 digest:     {}", hash_value::<MD5Accumulator>());
    println!("   SHA-256 digest: {}", hash_value::<SHA256Accumulator>());
    println!();
}
