/// Hexdump a program based on <https://skilldrick.github.io/easy6502>:
/// each 16-byte row is prefixed with its memory address.
pub fn hexdump(bytes: &[u8], origin: u16) -> String {
    const STRIDE: usize = 16;

    let mut out = String::new();
    for (row, chunk) in bytes.chunks(STRIDE).enumerate() {
        let address = origin as usize + row * STRIDE;
        out.push_str(format!("{:04x}:", address).as_str());
        for byte in chunk {
            out.push_str(format!(" {:02x}", byte).as_str());
        }
        out.push('\n');
    }
    out
}
