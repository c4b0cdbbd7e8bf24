//! Verschluesselte Nachricht (AES-CBC + HMAC-SHA256)
//!
//! ```text
//! Offset      Len   Beschreibung
//! ----------  ----  -----------
//!  0            1   Header (0x02)
//!  1           44   Schluessel-Fingerprint (ASCII, Base64)
//! 45           16   Ephemerer Nachrichten-Schluessel (KDF-Salt)
//! 61          n*16  Ciphertext (n >= 1), enthaelt das innere Frame
//! 61+C         32   HMAC-SHA256 ueber Fingerprint, Nachrichten-Schluessel, Ciphertext
//! 93+C          4   CRC32 (big-endian)
//! ```
//!
//! Empfangsseite: erst HMAC pruefen, dann ableiten und entschluesseln.
//! Ohne gueltigen Tag laeuft die Chiffre nie.

use bytes::{BufMut, BytesMut};
use rand::rngs::OsRng;
use rand::RngCore;

use lncf_core::{KeyFingerprint, LncfError, Result};
use lncf_crypto::{aes_cbc_decrypt, aes_cbc_encrypt, KeyRegistry, AES_BLOCK_SIZE, HMAC_TAG_SIZE, MSG_KEY_SIZE};

use crate::data::{body_len, body_pruefen, body_schreiben, DataMessage};
use crate::header::{PacketHeader, PacketKind};
use crate::inner;
use crate::lesen::Leser;
use crate::packet::{crc_anhaengen, groesse_pruefen};
use crate::CRC_SIZE;

/// Feste Felder im Rumpf (ohne Header, Ciphertext und CRC)
const FESTE_FELDER: usize = KeyFingerprint::SIZE + MSG_KEY_SIZE + HMAC_TAG_SIZE;

/// Zerlegte, noch nicht geoeffnete verschluesselte Nachricht
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    pub fingerprint: KeyFingerprint,
    pub message_key: [u8; MSG_KEY_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; HMAC_TAG_SIZE],
}

impl EncryptedMessage {
    /// Verschluesselt `topic` + `payload` mit dem Schluessel hinter `fingerprint`
    ///
    /// Der ephemere Nachrichten-Schluessel kommt aus dem OS-CSPRNG.
    ///
    /// # Fehler
    /// - `TopicTooLong`, `PayloadTooLarge` wie bei Klartext-Nachrichten
    /// - `UnknownKey` wenn der Fingerprint nicht registriert ist
    pub fn seal(
        registry: &KeyRegistry,
        fingerprint: &KeyFingerprint,
        topic: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let mut message_key = [0u8; MSG_KEY_SIZE];
        OsRng.fill_bytes(&mut message_key);
        Self::seal_with_message_key(registry, fingerprint, topic, payload, message_key)
    }

    /// Wie [`seal`](Self::seal), aber mit vorgegebenem Nachrichten-Schluessel
    pub fn seal_with_message_key(
        registry: &KeyRegistry,
        fingerprint: &KeyFingerprint,
        topic: &str,
        payload: &[u8],
        message_key: [u8; MSG_KEY_SIZE],
    ) -> Result<Vec<u8>> {
        body_pruefen(topic, payload)?;
        if !registry.contains(fingerprint) {
            return Err(LncfError::UnknownKey(fingerprint.to_string()));
        }

        let inhalt_laenge = body_len(topic, payload);
        let ciphertext_laenge = inner::frame_len(inhalt_laenge);
        let gesamt = 1 + FESTE_FELDER + ciphertext_laenge + CRC_SIZE;
        groesse_pruefen(gesamt)?;

        let mut inhalt = BytesMut::with_capacity(inhalt_laenge);
        body_schreiben(&mut inhalt, topic, payload);
        let frame = inner::pack(&inhalt)?;

        let keys = registry.kdf(&message_key, fingerprint)?;
        let ciphertext = aes_cbc_encrypt(keys.aes_key.as_bytes(), &keys.iv, &frame)?;

        let mut buf = BytesMut::with_capacity(gesamt);
        buf.put_u8(PacketHeader::for_kind(PacketKind::Encrypted).encode());
        buf.put_slice(fingerprint.as_bytes());
        buf.put_slice(&message_key);
        buf.put_slice(&ciphertext);
        let tag = registry.hmac_sha256(fingerprint, &buf[1..])?;
        buf.put_slice(&tag);
        crc_anhaengen(&mut buf);

        Ok(buf.to_vec())
    }

    /// Zerlegt den Rumpf (ohne Header und CRC)
    pub fn decode_body(rumpf: &[u8]) -> Result<Self> {
        if rumpf.len() < FESTE_FELDER + AES_BLOCK_SIZE {
            return Err(LncfError::malformed(format!(
                "verschluesselte Nachricht zu kurz: {} Bytes",
                rumpf.len()
            )));
        }
        let ciphertext_laenge = rumpf.len() - FESTE_FELDER;
        if ciphertext_laenge % AES_BLOCK_SIZE != 0 {
            return Err(LncfError::malformed(format!(
                "Ciphertext nicht blockbuendig: {ciphertext_laenge} Bytes"
            )));
        }

        let mut leser = Leser::neu(rumpf);
        let fingerprint = KeyFingerprint::from_wire(leser.bytes(KeyFingerprint::SIZE, "Fingerprint")?)
            .ok_or_else(|| LncfError::malformed("Fingerprint ist kein ASCII"))?;

        let mut message_key = [0u8; MSG_KEY_SIZE];
        message_key.copy_from_slice(leser.bytes(MSG_KEY_SIZE, "Nachrichten-Schluessel")?);

        let ciphertext = leser.bytes(ciphertext_laenge, "Ciphertext")?.to_vec();

        let mut tag = [0u8; HMAC_TAG_SIZE];
        tag.copy_from_slice(leser.bytes(HMAC_TAG_SIZE, "HMAC")?);
        leser.ende("verschluesselte Nachricht")?;

        Ok(Self {
            fingerprint,
            message_key,
            ciphertext,
            tag,
        })
    }

    /// Die vom HMAC abgedeckten Bytes, gefolgt vom Tag
    fn mit_tag(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FESTE_FELDER + self.ciphertext.len());
        buf.extend_from_slice(self.fingerprint.as_bytes());
        buf.extend_from_slice(&self.message_key);
        buf.extend_from_slice(&self.ciphertext);
        buf.extend_from_slice(&self.tag);
        buf
    }

    /// Prueft, entschluesselt und parst den inneren Inhalt
    ///
    /// # Fehler
    /// - `UnknownKey` wenn der Fingerprint nicht registriert ist
    /// - `Authentifizierung` bei falschem Tag
    /// - `Malformed` bei ungueltigem inneren Frame
    pub fn open(&self, registry: &KeyRegistry) -> Result<DataMessage> {
        if !registry.contains(&self.fingerprint) {
            return Err(LncfError::UnknownKey(self.fingerprint.to_string()));
        }
        if !registry.verify_hmac256(&self.fingerprint, &self.mit_tag()) {
            return Err(LncfError::Authentifizierung);
        }

        let keys = registry.kdf(&self.message_key, &self.fingerprint)?;
        let klartext = aes_cbc_decrypt(keys.aes_key.as_bytes(), &keys.iv, &self.ciphertext)?;
        let inhalt = inner::unpack(&klartext)?;
        DataMessage::decode_body(inhalt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
