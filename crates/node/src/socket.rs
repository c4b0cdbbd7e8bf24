//! Multicast-Socket – Adressen validieren, binden, Gruppe beitreten
//!
//! Der Socket wird ueber socket2 aufgebaut, damit Adress-Wiederverwendung
//! vor dem Bind gesetzt werden kann, und dann an tokio uebergeben.
//!
//! Ist die Gruppenadresse keine Multicast-Adresse, laeuft der Knoten im
//! Unicast-Betrieb: kein Beitritt, Pakete gehen direkt an diese Adresse.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use lncf_core::{LncfError, Result};

/// Validierte Listen- und Gruppenadresse eines Knotens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpunkte {
    pub listen: IpAddr,
    pub gruppe: IpAddr,
    pub port: u16,
}

impl Endpunkte {
    /// Parst beide Adressen und prueft, dass sie zur selben Familie gehoeren
    pub fn parsen(listen: &str, gruppe: &str, port: u16) -> Result<Self> {
        let listen: IpAddr = listen
            .trim()
            .parse()
            .map_err(|_| LncfError::UngueltigeAdresse(format!("Listen-Adresse '{listen}'")))?;
        let gruppe: IpAddr = gruppe
            .trim()
            .parse()
            .map_err(|_| LncfError::UngueltigeAdresse(format!("Gruppen-Adresse '{gruppe}'")))?;

        if listen.is_ipv4() != gruppe.is_ipv4() {
            return Err(LncfError::UngueltigeAdresse(format!(
                "gemischte Adressfamilien: {listen} und {gruppe}"
            )));
        }

        Ok(Self {
            listen,
            gruppe,
            port,
        })
    }

    pub fn bind_adresse(&self) -> SocketAddr {
        SocketAddr::new(self.listen, self.port)
    }

    pub fn ist_multicast(&self) -> bool {
        self.gruppe.is_multicast()
    }
}

/// Erstellt den UDP-Socket mit Adress-Wiederverwendung, noch ungebunden
pub fn socket_erstellen(endpunkte: &Endpunkte) -> Result<Socket> {
    let socket = Socket::new(
        Domain::for_address(endpunkte.bind_adresse()),
        Type::DGRAM,
        Some(Protocol::UDP),
    )?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    Ok(socket)
}

/// Bindet den Socket, tritt der Gruppe bei und uebergibt ihn an tokio
///
/// Muss innerhalb einer tokio-Runtime aufgerufen werden.
pub fn binden_und_beitreten(socket: Socket, endpunkte: &Endpunkte) -> Result<UdpSocket> {
    socket.bind(&endpunkte.bind_adresse().into())?;

    match endpunkte.gruppe {
        IpAddr::V4(gruppe) if gruppe.is_multicast() => {
            let interface = match endpunkte.listen {
                IpAddr::V4(listen) if !listen.is_multicast() => listen,
                _ => Ipv4Addr::UNSPECIFIED,
            };
            socket.join_multicast_v4(&gruppe, &interface)?;
            socket.set_multicast_loop_v4(true)?;
            tracing::info!(gruppe = %gruppe, interface = %interface, "Multicast-Gruppe beigetreten");
        }
        IpAddr::V6(gruppe) if gruppe.is_multicast() => {
            socket.join_multicast_v6(&gruppe, 0)?;
            socket.set_multicast_loop_v6(true)?;
            tracing::info!(gruppe = %gruppe, "Multicast-Gruppe beigetreten (IPv6)");
        }
        gruppe => {
            tracing::warn!(
                gruppe = %gruppe,
                "Gruppen-Adresse ist keine Multicast-Adresse, Unicast-Betrieb"
            );
        }
    }

    socket.set_nonblocking(true)?;
    Ok(UdpSocket::from_std(socket.into())?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
