// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

//! Feeds a recorded chat reply through the frame decoder in awkward chunks,
//! the way a slow network delivers it.

use vertex_core::chat::{Frame, FrameDecoder};

const RECORDED_REPLY: &str = "data: {\"chunk\":\"Your RELIANCE position is up \"}\n\n\
: keepalive\n\n\
data: {\"chunk\":\"₹1,240 today.\"}\n\n\
data: {\"chunk\":\"\"}\n\n\
data: [DONE]\n\n\
data: {\"chunk\":\"never shown\"}\n\n";

fn main() {
    println!("🔧 Decoding a recorded reply in 7-byte chunks");
    println!("=============================================");

    let mut decoder = FrameDecoder::new();
    let mut message = String::new();

    for chunk in RECORDED_REPLY.as_bytes().chunks(7) {
        for frame in decoder.push(chunk) {
            match frame {
                Frame::Delta(text) => {
                    println!("📦 Delta: {:?}", text);
                    message.push_str(&text);
                }
                Frame::Error(error) => println!("❌ Server error: {}", error),
                Frame::Malformed(payload) => println!("⚠️ Skipped malformed frame: {}", payload),
                Frame::Done => println!("🏁 [DONE]"),
            }
        }
        if decoder.is_finished() {
            break;
        }
    }
    decoder.finish();

    println!("\n✨ Assembled message: {:?}", message);
}
