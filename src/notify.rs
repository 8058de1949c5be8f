//! Notification relay
//!
//! Turns the transport's raw value-changed events into a typed stream for
//! one characteristic. Events are decoded in delivery order, once each.

use core::future::Future;
use core::marker::PhantomData;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures::future;
use futures::stream::{BoxStream, Stream};
use futures::StreamExt;
use uuid::Uuid;

use crate::codec::{CodecError, GattValue};
use crate::gatt::Notification;
use crate::session::CharacteristicHandle;

/// Live notification subscription
///
/// Yields one item per value-changed event. A payload that does not decode
/// is yielded as an error. The stream ends when the session disconnects;
/// pass it to [`Session::unsubscribe`](crate::Session::unsubscribe) to stop
/// notifications earlier.
pub struct Subscription<V> {
    handle: CharacteristicHandle,
    values: BoxStream<'static, Result<V, CodecError>>,
    _value: PhantomData<fn() -> V>,
}

impl<V: GattValue + Send + 'static> Subscription<V> {
    pub(crate) fn new<F>(
        handle: CharacteristicHandle,
        notifications: BoxStream<'static, Notification>,
        closed: F,
    ) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle,
            values: relay(notifications, handle.address.characteristic, closed),
            _value: PhantomData,
        }
    }
}

impl<V> Subscription<V> {
    pub fn handle(&self) -> &CharacteristicHandle {
        &self.handle
    }
}

impl<V> Stream for Subscription<V> {
    type Item = Result<V, CodecError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.values.poll_next_unpin(cx)
    }
}

/// Filter `notifications` down to `characteristic`, decode each payload, and
/// stop once `closed` resolves.
fn relay<V, F>(
    notifications: BoxStream<'static, Notification>,
    characteristic: Uuid,
    closed: F,
) -> BoxStream<'static, Result<V, CodecError>>
where
    V: GattValue + Send + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    notifications
        .filter(move |n| future::ready(n.characteristic == characteristic))
        .map(|n| V::decode(&n.value))
        .take_until(closed)
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Vector3;
    use futures::channel::{mpsc, oneshot};

    const DATA: Uuid = Uuid::from_u128(0xe95dca4b_251d_470a_a062_fa1922dfa9a8);
    const OTHER: Uuid = Uuid::from_u128(0xe95d9715_251d_470a_a062_fa1922dfa9a8);

    fn event(characteristic: Uuid, value: &[u8]) -> Notification {
        Notification {
            characteristic,
            value: value.to_vec(),
        }
    }

    #[test]
    fn test_relay_filters_and_decodes_in_order() {
        let (tx, rx) = mpsc::unbounded();
        tx.unbounded_send(event(DATA, &[1, 0, 2, 0, 3, 0])).unwrap();
        tx.unbounded_send(event(OTHER, &[0x5A, 0x00])).unwrap();
        tx.unbounded_send(event(DATA, &[4, 0, 5, 0, 6, 0])).unwrap();
        tx.unbounded_send(event(DATA, &[4, 0, 5, 0, 6, 0])).unwrap();
        drop(tx);

        let values: Vec<Result<Vector3, CodecError>> = futures::executor::block_on(
            relay(rx.boxed(), DATA, future::pending()).collect(),
        );

        assert_eq!(
            values,
            vec![
                Ok(Vector3 { x: 1, y: 2, z: 3 }),
                Ok(Vector3 { x: 4, y: 5, z: 6 }),
                Ok(Vector3 { x: 4, y: 5, z: 6 }),
            ]
        );
    }

    #[test]
    fn test_relay_yields_decode_errors() {
        let (tx, rx) = mpsc::unbounded();
        tx.unbounded_send(event(OTHER, &[0x01])).unwrap();
        tx.unbounded_send(event(OTHER, &[0x5A, 0x00])).unwrap();
        drop(tx);

        let values: Vec<Result<u16, CodecError>> = futures::executor::block_on(
            relay(rx.boxed(), OTHER, future::pending()).collect(),
        );

        assert_eq!(
            values,
            vec![
                Err(CodecError::TooShort {
                    expected: 2,
                    actual: 1
                }),
                Ok(90),
            ]
        );
    }

    #[test]
    fn test_relay_stops_when_closed() {
        let (tx, rx) = mpsc::unbounded();
        let (close_tx, close_rx) = oneshot::channel::<()>();
        let mut stream = relay::<u16, _>(rx.boxed(), OTHER, async move {
            let _ = close_rx.await;
        });

        futures::executor::block_on(async {
            tx.unbounded_send(event(OTHER, &[0x01, 0x00])).unwrap();
            assert_eq!(stream.next().await, Some(Ok(1)));

            close_tx.send(()).unwrap();
            tx.unbounded_send(event(OTHER, &[0x02, 0x00])).unwrap();
            assert_eq!(stream.next().await, None);
        });
    }
}
